use async_trait::async_trait;

use crate::models::{GameScoreEvent, LeaderboardRecord, PlayerProfile, Result};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Durable player data keyed by wallet address.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArcadeStore: Send + Sync {
    async fn load_profile(&self, address: &str) -> Result<Option<PlayerProfile>>;

    async fn save_profile(&self, profile: &PlayerProfile) -> Result<()>;

    async fn append_score(&self, event: &GameScoreEvent) -> Result<()>;

    /// Newest first.
    async fn score_history(&self, address: &str, limit: usize) -> Result<Vec<GameScoreEvent>>;

    async fn leaderboard_record(&self, address: &str) -> Result<Option<LeaderboardRecord>>;

    /// Replace the row for `record.address`, keeping its arrival position.
    async fn upsert_leaderboard(&self, record: &LeaderboardRecord) -> Result<()>;

    /// Every row in arrival order.
    async fn leaderboard_records(&self) -> Result<Vec<LeaderboardRecord>>;
}
