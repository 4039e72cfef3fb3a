use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

use crate::{
    ledger::{MintRequest, RewardLedger, TransferRequest, TxResult},
    models::{ArcadeError, Result},
    rewards::find_badge,
};

#[derive(Debug, Default)]
struct LedgerBook {
    balances: HashMap<String, u64>,
    badges: HashMap<String, Vec<String>>,
}

/// In-process stand-in for the reward ledger.
///
/// Every call waits `confirmation_delay`, then confirms unless the configured
/// failure rate says otherwise.
pub struct SimulatedLedger {
    confirmation_delay: Duration,
    failure_rate: f64,
    rng: Mutex<StdRng>,
    book: Mutex<LedgerBook>,
}

impl SimulatedLedger {
    pub fn new(confirmation_delay: Duration) -> Self {
        Self {
            confirmation_delay,
            failure_rate: 0.0,
            rng: Mutex::new(StdRng::from_entropy()),
            book: Mutex::new(LedgerBook::default()),
        }
    }

    pub fn from_settings(settings: &crate::config::LedgerSettings) -> Self {
        Self::new(Duration::from_millis(settings.confirmation_delay_ms))
    }

    /// Probability in `[0, 1]` that a call is rejected.
    pub fn with_failure_rate(mut self, failure_rate: f64) -> Self {
        self.failure_rate = failure_rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    /// Confirmed reward tokens held by `address`.
    pub fn balance_of(&self, address: &str) -> u64 {
        self.book().balances.get(address).copied().unwrap_or(0)
    }

    pub fn badges_of(&self, address: &str) -> Vec<String> {
        self.book().badges.get(address).cloned().unwrap_or_default()
    }

    fn book(&self) -> MutexGuard<'_, LedgerBook> {
        self.book.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn confirm(&self, kind: &str) -> Result<()> {
        tokio::time::sleep(self.confirmation_delay).await;

        let rejected = self.failure_rate > 0.0 && self.rng().gen_bool(self.failure_rate);
        if rejected {
            return Err(ArcadeError::RewardIssuance {
                kind: kind.to_string(),
                message: "transaction rejected by ledger".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RewardLedger for SimulatedLedger {
    async fn transfer(&self, request: &TransferRequest) -> Result<TxResult> {
        debug!("Transferring {} tokens to {}", request.amount, request.address);
        self.confirm("tokens").await?;

        let tx_id = format!("MOCK_{}", Utc::now().timestamp_millis());
        *self.book().balances.entry(request.address.clone()).or_insert(0) += request.amount;

        info!(
            "Confirmed {} tokens for {} ({} score {}): {}",
            request.amount,
            request.address,
            request.game_type.as_str(),
            request.score,
            tx_id
        );
        Ok(TxResult { tx_id })
    }

    async fn mint(&self, request: &MintRequest) -> Result<TxResult> {
        find_badge(&request.metadata.name)?;
        debug!("Minting {} for {}", request.metadata.name, request.address);
        self.confirm("badge").await?;

        let suffix: u32 = self.rng().gen();
        let tx_id = format!("NFTMINT_{}_{:x}", Utc::now().timestamp_millis(), suffix);
        self.book()
            .badges
            .entry(request.address.clone())
            .or_default()
            .push(request.metadata.name.clone());

        info!("Minted {} for {}: {}", request.metadata.name, request.address, tx_id);
        Ok(TxResult { tx_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GameType;
    use crate::rewards::BadgeMetadata;

    fn transfer(amount: u64) -> TransferRequest {
        TransferRequest {
            address: "ALGO1".to_string(),
            amount,
            game_type: GameType::Snake,
            score: 120,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transfer_waits_for_confirmation() {
        let ledger = SimulatedLedger::new(Duration::from_millis(2_000));
        let started = tokio::time::Instant::now();

        let tx = ledger.transfer(&transfer(10)).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(2_000));
        assert!(tx.tx_id.starts_with("MOCK_"));
        assert_eq!(ledger.balance_of("ALGO1"), 10);

        ledger.transfer(&transfer(5)).await.unwrap();
        assert_eq!(ledger.balance_of("ALGO1"), 15);
        assert_eq!(ledger.balance_of("ALGO2"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mint_records_badge() {
        let ledger = SimulatedLedger::new(Duration::from_millis(10));
        let request = MintRequest {
            address: "ALGO1".to_string(),
            metadata: BadgeMetadata::for_badge("Snake Master").unwrap(),
            game_type: GameType::Snake,
            score: 500,
        };

        let tx = ledger.mint(&request).await.unwrap();
        assert!(tx.tx_id.starts_with("NFTMINT_"));
        assert_eq!(ledger.badges_of("ALGO1"), vec!["Snake Master"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mint_rejects_unknown_badge() {
        let ledger = SimulatedLedger::new(Duration::ZERO);
        let mut metadata = BadgeMetadata::for_badge("First Steps").unwrap();
        metadata.name = "Pinball Wizard".to_string();
        let request = MintRequest {
            address: "ALGO1".to_string(),
            metadata,
            game_type: GameType::Memory,
            score: 1,
        };

        assert!(matches!(ledger.mint(&request).await, Err(ArcadeError::BadgeNotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_rate_one_always_fails() {
        let ledger = SimulatedLedger::new(Duration::ZERO).with_failure_rate(1.0).with_seed(3);

        let err = ledger.transfer(&transfer(10)).await.unwrap_err();
        assert!(matches!(err, ArcadeError::RewardIssuance { ref kind, .. } if kind == "tokens"));
        assert_eq!(ledger.balance_of("ALGO1"), 0);
    }
}
