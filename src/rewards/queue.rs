use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::{
    config::IssuanceSettings,
    ledger::{MintRequest, ResilientCaller, RewardLedger, TransferRequest, TxResult},
    models::{ArcadeError, GameType, Result},
    rewards::BadgeMetadata,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum RewardKind {
    Tokens(u64),
    Badge(String),
}

impl RewardKind {
    pub fn label(&self) -> &'static str {
        match self {
            RewardKind::Tokens(_) => "tokens",
            RewardKind::Badge(_) => "badge",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum AttemptStatus {
    Pending,
    Confirmed { tx_id: String },
    Failed { error: String },
}

/// One reward payout and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardAttempt {
    pub id: u64,
    pub address: String,
    pub kind: RewardKind,
    pub game_type: GameType,
    pub score: i64,
    pub status: AttemptStatus,
    /// Ledger calls made so far, across retries.
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RewardAttempt {
    pub fn is_confirmed(&self) -> bool {
        matches!(self.status, AttemptStatus::Confirmed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, AttemptStatus::Failed { .. })
    }
}

/// Handle for a queued reward; resolves once the attempt settles.
#[derive(Debug)]
pub struct RewardTicket {
    pub id: u64,
    receiver: oneshot::Receiver<RewardAttempt>,
}

impl RewardTicket {
    pub async fn wait(self) -> Result<RewardAttempt> {
        self.receiver.await.map_err(|_| ArcadeError::RewardIssuance {
            kind: "queue".to_string(),
            message: "reward worker stopped".to_string(),
        })
    }
}

struct Job {
    id: u64,
    done: oneshot::Sender<RewardAttempt>,
}

struct Worker {
    ledger: Arc<dyn RewardLedger>,
    caller: ResilientCaller,
    log: RwLock<HashMap<u64, RewardAttempt>>,
    confirmed_capacity: usize,
}

/// Background issuance of reward tokens and badges.
pub struct RewardQueue {
    worker: Arc<Worker>,
    sender: mpsc::UnboundedSender<Job>,
    next_id: AtomicU64,
    handle: JoinHandle<()>,
}

impl RewardQueue {
    /// Must be called inside a tokio runtime.
    pub fn new(ledger: Arc<dyn RewardLedger>, settings: &IssuanceSettings) -> Self {
        let worker = Arc::new(Worker {
            ledger,
            caller: ResilientCaller::from_settings("reward_ledger", settings),
            log: RwLock::new(HashMap::new()),
            confirmed_capacity: settings.confirmed_log_capacity,
        });
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

        let dispatcher = worker.clone();
        let handle = tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                let worker = dispatcher.clone();
                tokio::spawn(async move {
                    let settled = worker.process(job.id).await;
                    if let Some(attempt) = settled {
                        let _ = job.done.send(attempt);
                    }
                });
            }
        });

        Self {
            worker,
            sender,
            next_id: AtomicU64::new(1),
            handle,
        }
    }

    pub async fn enqueue(
        &self,
        address: impl Into<String>,
        kind: RewardKind,
        game_type: GameType,
        score: i64,
    ) -> Result<RewardTicket> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let attempt = RewardAttempt {
            id,
            address: address.into(),
            kind,
            game_type,
            score,
            status: AttemptStatus::Pending,
            attempts: 0,
            created_at: now,
            updated_at: now,
        };
        self.worker.log.write().await.insert(id, attempt);
        self.dispatch(id)
    }

    /// Re-run a failed attempt under the same id.
    pub async fn retry(&self, id: u64) -> Result<RewardTicket> {
        {
            let mut log = self.worker.log.write().await;
            let attempt = log
                .get_mut(&id)
                .ok_or_else(|| ArcadeError::Validation(format!("unknown reward attempt {}", id)))?;
            if !attempt.is_failed() {
                return Err(ArcadeError::Validation(format!(
                    "reward attempt {} has not failed",
                    id
                )));
            }
            attempt.status = AttemptStatus::Pending;
            attempt.updated_at = Utc::now();
        }
        info!("Retrying reward attempt {}", id);
        self.dispatch(id)
    }

    pub async fn attempt(&self, id: u64) -> Option<RewardAttempt> {
        self.worker.log.read().await.get(&id).cloned()
    }

    /// Every attempt for `address`, oldest first.
    pub async fn attempts_for(&self, address: &str) -> Vec<RewardAttempt> {
        let log = self.worker.log.read().await;
        let mut attempts: Vec<RewardAttempt> =
            log.values().filter(|a| a.address == address).cloned().collect();
        attempts.sort_by_key(|a| a.id);
        attempts
    }

    fn dispatch(&self, id: u64) -> Result<RewardTicket> {
        let (done, receiver) = oneshot::channel();
        self.sender.send(Job { id, done }).map_err(|_| ArcadeError::RewardIssuance {
            kind: "queue".to_string(),
            message: "reward worker stopped".to_string(),
        })?;
        Ok(RewardTicket { id, receiver })
    }
}

impl Drop for RewardQueue {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl Worker {
    async fn process(&self, id: u64) -> Option<RewardAttempt> {
        let attempt = self.log.read().await.get(&id).cloned()?;
        let calls = AtomicU32::new(0);

        let outcome = match &attempt.kind {
            RewardKind::Tokens(amount) => {
                let request = TransferRequest {
                    address: attempt.address.clone(),
                    amount: *amount,
                    game_type: attempt.game_type,
                    score: attempt.score,
                };
                self.caller
                    .call(|| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        self.ledger.transfer(&request)
                    })
                    .await
            }
            RewardKind::Badge(name) => match BadgeMetadata::for_badge(name) {
                Ok(metadata) => {
                    let request = MintRequest {
                        address: attempt.address.clone(),
                        metadata,
                        game_type: attempt.game_type,
                        score: attempt.score,
                    };
                    self.caller
                        .call(|| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            self.ledger.mint(&request)
                        })
                        .await
                }
                Err(e) => Err(e),
            },
        };

        self.settle(id, calls.load(Ordering::SeqCst), outcome).await
    }

    async fn settle(&self, id: u64, calls: u32, outcome: Result<TxResult>) -> Option<RewardAttempt> {
        let mut log = self.log.write().await;
        let attempt = log.get_mut(&id)?;
        attempt.attempts += calls;
        attempt.updated_at = Utc::now();

        match outcome {
            Ok(tx) => {
                info!(
                    "Reward {} ({}) confirmed for {}: {}",
                    id,
                    attempt.kind.label(),
                    attempt.address,
                    tx.tx_id
                );
                attempt.status = AttemptStatus::Confirmed { tx_id: tx.tx_id };
            }
            Err(e) => {
                if matches!(e, ArcadeError::BadgeNotFound(_)) {
                    error!("Reward {} for {} cannot be issued: {}", id, attempt.address, e);
                } else {
                    warn!("Reward {} for {} failed: {}", id, attempt.address, e);
                }
                attempt.status = AttemptStatus::Failed { error: e.to_string() };
            }
        }

        let settled = attempt.clone();
        if settled.is_confirmed() {
            prune_confirmed(&mut log, self.confirmed_capacity);
        }
        Some(settled)
    }
}

/// Drop the oldest confirmed attempts beyond `capacity`. Pending and failed
/// attempts stay so they can still be retried.
fn prune_confirmed(log: &mut HashMap<u64, RewardAttempt>, capacity: usize) {
    let mut confirmed: Vec<u64> = log.values().filter(|a| a.is_confirmed()).map(|a| a.id).collect();
    if confirmed.len() <= capacity {
        return;
    }
    confirmed.sort_unstable();
    let excess = confirmed.len() - capacity;
    for id in &confirmed[..excess] {
        log.remove(id);
    }
}
