use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{OwnedMutexGuard, RwLock};
use tracing::{debug, info, warn};

use crate::{
    games::SessionResult,
    models::{
        ArcadeError, BestReward, GameScoreEvent, GameType, LeaderboardEntry, LeaderboardRecord,
        PlayerProfile, PlayerStats, Result, SubmitScoreRequest,
    },
    rewards::{RewardKind, RewardQueue, RewardTicket},
    scoring::{apply_score, project, ScoreSubmission, TierTable},
    store::ArcadeStore,
};

/// One async mutex per key. Writers for the same address run one at a time.
///
/// A key's entry lives only while some task holds or waits on it.
#[derive(Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: &str) -> KeyGuard<'_> {
        let slot = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(key.to_string()).or_default().clone()
        };
        KeyGuard {
            locks: self,
            key: key.to_string(),
            guard: Some(slot.lock_owned().await),
        }
    }

    /// Number of keys currently held or awaited.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct KeyGuard<'a> {
    locks: &'a KeyedLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = self.locks.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Waiters clone the slot under this map lock, so a count of one is final.
        if locks.get(&self.key).is_some_and(|slot| Arc::strong_count(slot) == 1) {
            locks.remove(&self.key);
        }
    }
}

/// Result of folding one finished game into a player's profile.
#[derive(Debug)]
pub struct ScoreOutcome {
    pub event: GameScoreEvent,
    pub reward: BestReward,
    pub stats: PlayerStats,
    /// Badge added to the profile by this submission, if any.
    pub new_badge: Option<String>,
    /// False when the store write failed; the in-memory profile still holds the update.
    pub persisted: bool,
    pub tickets: Vec<RewardTicket>,
}

pub struct ArcadeService {
    store: Arc<dyn ArcadeStore>,
    tiers: TierTable,
    rewards: Option<Arc<RewardQueue>>,
    attached: RwLock<HashMap<String, PlayerProfile>>,
    locks: KeyedLocks,
}

fn rename(profile: &mut PlayerProfile, display_name: Option<&str>) {
    if let Some(name) = display_name.map(str::trim).filter(|n| !n.is_empty()) {
        profile.display_name = name.to_string();
    }
}

fn normalize_address(address: &str) -> Result<String> {
    let address = address.trim();
    if address.is_empty() {
        return Err(ArcadeError::IdentityMissing);
    }
    Ok(address.to_string())
}

impl ArcadeService {
    pub fn new(store: Arc<dyn ArcadeStore>, tiers: TierTable) -> Self {
        Self {
            store,
            tiers,
            rewards: None,
            attached: RwLock::new(HashMap::new()),
            locks: KeyedLocks::new(),
        }
    }

    pub fn with_rewards(mut self, rewards: Arc<RewardQueue>) -> Self {
        self.rewards = Some(rewards);
        self
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    pub fn rewards(&self) -> Option<&RewardQueue> {
        self.rewards.as_deref()
    }

    /// Load (or create) the profile for a newly connected wallet.
    ///
    /// When the store cannot be read the caller still gets a fresh profile,
    /// but it is not cached: the next submission retries the load.
    pub async fn attach(&self, address: &str, display_name: Option<&str>) -> Result<PlayerProfile> {
        let address = normalize_address(address)?;
        let _guard = self.locks.lock(&address).await;
        match self.attach_locked(&address, display_name).await {
            Err(e) if e.is_persistence() => {
                warn!("Failed to load profile for {}, not attaching: {}", address, e);
                let mut profile = PlayerProfile::new(address.as_str());
                rename(&mut profile, display_name);
                Ok(profile)
            }
            other => other,
        }
    }

    async fn attach_locked(&self, address: &str, display_name: Option<&str>) -> Result<PlayerProfile> {
        let stored = self.store.load_profile(address).await?;
        let mut profile = stored.unwrap_or_else(|| PlayerProfile::new(address));
        rename(&mut profile, display_name);

        info!("Attached {} ({} games played)", address, profile.stats.games_played);
        self.attached
            .write()
            .await
            .insert(address.to_string(), profile.clone());
        Ok(profile)
    }

    /// Forget the session profile. Stored data is untouched.
    pub async fn detach(&self, address: &str) -> Option<PlayerProfile> {
        let detached = self.attached.write().await.remove(address.trim());
        if detached.is_some() {
            info!("Detached {}", address.trim());
        }
        detached
    }

    pub async fn profile(&self, address: &str) -> Option<PlayerProfile> {
        self.attached.read().await.get(address.trim()).cloned()
    }

    pub async fn submit_session(&self, address: &str, result: &SessionResult) -> Result<ScoreOutcome> {
        self.submit_score(result.submission(address)).await
    }

    pub async fn submit_score(&self, submission: ScoreSubmission) -> Result<ScoreOutcome> {
        let address = submission
            .player_address
            .as_deref()
            .ok_or(ArcadeError::IdentityMissing)
            .and_then(normalize_address)?;

        let _guard = self.locks.lock(&address).await;

        let attached = self.attached.read().await.get(&address).cloned();
        let current = match attached {
            Some(profile) => profile,
            None => self.attach_locked(&address, None).await?,
        };

        let aggregation = apply_score(&current.stats, &self.tiers, &submission)?;

        let mut profile = current;
        let before = std::mem::replace(&mut profile.stats, aggregation.stats.clone());
        profile.updated_at = Utc::now();

        let persisted = match self.persist(&before, &profile, &aggregation.event).await {
            Ok(()) => true,
            Err(e) if e.is_persistence() => {
                warn!("Score for {} kept in memory only: {}", address, e);
                false
            }
            Err(e) => return Err(e),
        };
        self.attached
            .write()
            .await
            .insert(address.clone(), profile);

        info!(
            "{} scored {} in {} (+{} tokens)",
            address,
            aggregation.event.score,
            aggregation.event.game_type.as_str(),
            aggregation.reward.tokens
        );

        let tickets = self
            .enqueue_rewards(&address, &aggregation.event, &aggregation.reward, &aggregation.new_badge)
            .await;

        Ok(ScoreOutcome {
            event: aggregation.event,
            reward: aggregation.reward,
            stats: aggregation.stats,
            new_badge: aggregation.new_badge,
            persisted,
            tickets,
        })
    }

    async fn persist(&self, before: &PlayerStats, profile: &PlayerProfile, event: &GameScoreEvent) -> Result<()> {
        self.store.save_profile(profile).await?;
        self.store.append_score(event).await?;
        let existing = self.store.leaderboard_record(&profile.address).await?;
        self.store
            .upsert_leaderboard(&LeaderboardRecord::advance(existing.as_ref(), before, profile))
            .await
    }

    async fn enqueue_rewards(
        &self,
        address: &str,
        event: &GameScoreEvent,
        reward: &BestReward,
        new_badge: &Option<String>,
    ) -> Vec<RewardTicket> {
        let Some(queue) = &self.rewards else {
            return Vec::new();
        };

        let mut kinds = Vec::new();
        if reward.tokens > 0 {
            kinds.push(RewardKind::Tokens(reward.tokens));
        }
        if let Some(badge) = new_badge {
            kinds.push(RewardKind::Badge(badge.clone()));
        }

        let mut tickets = Vec::new();
        for kind in kinds {
            match queue.enqueue(address, kind, event.game_type, event.score).await {
                Ok(ticket) => tickets.push(ticket),
                Err(e) => warn!("Could not queue reward for {}: {}", address, e),
            }
        }
        tickets
    }

    /// Fold an HTTP leaderboard submission into the stored record.
    pub async fn record_submission(&self, request: &SubmitScoreRequest) -> Result<LeaderboardRecord> {
        let address = normalize_address(&request.address)?;
        if GameType::from_str(&request.game_type).is_none() {
            debug!("Accepting submission for unrecognized game '{}'", request.game_type);
        }

        let _guard = self.locks.lock(&address).await;
        let existing = self.store.leaderboard_record(&address).await?;
        let record = LeaderboardRecord::accumulate(existing.as_ref(), request);
        self.store.upsert_leaderboard(&record).await?;
        Ok(record)
    }

    pub async fn leaderboard(&self, limit: Option<usize>) -> Result<Vec<LeaderboardEntry>> {
        let mut entries = project(self.store.leaderboard_records().await?);
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    pub async fn history(&self, address: &str, limit: usize) -> Result<Vec<GameScoreEvent>> {
        self.store.score_history(address.trim(), limit).await
    }
}
