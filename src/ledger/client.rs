use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{GameType, Result};
use crate::rewards::BadgeMetadata;

/// Reads wallet balances from the chain.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountReader: Send + Sync {
    /// Spendable balance in microAlgos.
    async fn micro_algos(&self, address: &str) -> Result<u64>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub address: String,
    pub amount: u64,
    pub game_type: GameType,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    pub address: String,
    pub metadata: BadgeMetadata,
    pub game_type: GameType,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxResult {
    pub tx_id: String,
}

/// Pays out reward tokens and mints badges.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardLedger: Send + Sync {
    async fn transfer(&self, request: &TransferRequest) -> Result<TxResult>;

    async fn mint(&self, request: &MintRequest) -> Result<TxResult>;
}

/// Configuration for HTTP ledger clients
#[derive(Debug, Clone)]
pub struct LedgerClientConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout_seconds: u64,
}

impl From<&crate::config::LedgerSettings> for LedgerClientConfig {
    fn from(settings: &crate::config::LedgerSettings) -> Self {
        Self {
            base_url: settings.algod_url.trim_end_matches('/').to_string(),
            api_token: Some(settings.algod_token.clone()).filter(|t| !t.is_empty()),
            timeout_seconds: settings.timeout_seconds,
        }
    }
}
