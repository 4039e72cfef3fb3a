use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::{
    config::DatabaseSettings,
    models::{ArcadeError, GameScoreEvent, GameType, LeaderboardRecord, PlayerProfile, Result},
    store::ArcadeStore,
};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS players (
        address TEXT PRIMARY KEY NOT NULL,
        display_name TEXT NOT NULL,
        stats TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS scores (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL,
        address TEXT NOT NULL,
        game_type TEXT NOT NULL,
        score INTEGER NOT NULL,
        difficulty TEXT,
        reward_tokens INTEGER,
        nft_badge_earned TEXT,
        played_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS scores_by_address ON scores (address, played_at)",
    "CREATE TABLE IF NOT EXISTS leaderboard (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        address TEXT NOT NULL UNIQUE,
        display_name TEXT NOT NULL,
        total_score INTEGER NOT NULL,
        tokens_earned INTEGER NOT NULL,
        badges INTEGER NOT NULL
    )",
];

#[derive(FromRow)]
struct PlayerRow {
    address: String,
    display_name: String,
    stats: String,
    updated_at: String,
}

#[derive(FromRow)]
struct ScoreRow {
    id: String,
    address: String,
    game_type: String,
    score: i64,
    difficulty: Option<String>,
    reward_tokens: Option<i64>,
    nft_badge_earned: Option<String>,
    played_at: String,
}

#[derive(FromRow)]
struct LeaderboardRow {
    address: String,
    display_name: String,
    total_score: i64,
    tokens_earned: i64,
    badges: i64,
}

/// SQLite-backed store. Stats are stored as JSON, timestamps as RFC 3339 text.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&settings.url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections.max(1))
            .acquire_timeout(Duration::from_secs(settings.connect_timeout_seconds))
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        info!("Connected to {}", settings.url);
        Ok(store)
    }

    /// Private in-memory database on a single pinned connection.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| ArcadeError::Persistence(format!("bad timestamp '{}': {}", raw, e)))
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

impl TryFrom<PlayerRow> for PlayerProfile {
    type Error = ArcadeError;

    fn try_from(row: PlayerRow) -> Result<Self> {
        Ok(PlayerProfile {
            address: row.address,
            display_name: row.display_name,
            stats: serde_json::from_str(&row.stats)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

impl TryFrom<ScoreRow> for GameScoreEvent {
    type Error = ArcadeError;

    fn try_from(row: ScoreRow) -> Result<Self> {
        let game_type = GameType::from_str(&row.game_type)
            .ok_or_else(|| ArcadeError::Persistence(format!("unknown game '{}'", row.game_type)))?;

        Ok(GameScoreEvent {
            id: row.id,
            game_type,
            score: row.score,
            timestamp: parse_timestamp(&row.played_at)?,
            player_address: row.address,
            difficulty: row.difficulty,
            reward_tokens: row.reward_tokens.map(to_u64),
            nft_badge_earned: row.nft_badge_earned,
        })
    }
}

impl From<LeaderboardRow> for LeaderboardRecord {
    fn from(row: LeaderboardRow) -> Self {
        LeaderboardRecord {
            address: row.address,
            display_name: row.display_name,
            total_score: row.total_score,
            tokens_earned: to_u64(row.tokens_earned),
            badges: u32::try_from(row.badges).unwrap_or(0),
        }
    }
}

#[async_trait]
impl ArcadeStore for SqliteStore {
    async fn load_profile(&self, address: &str) -> Result<Option<PlayerProfile>> {
        let row = sqlx::query_as::<_, PlayerRow>(
            "SELECT address, display_name, stats, updated_at FROM players WHERE address = ?",
        )
        .bind(address)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PlayerProfile::try_from).transpose()
    }

    async fn save_profile(&self, profile: &PlayerProfile) -> Result<()> {
        let stats = serde_json::to_string(&profile.stats)?;
        sqlx::query(
            "INSERT INTO players (address, display_name, stats, updated_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(address) DO UPDATE SET
                display_name = excluded.display_name,
                stats = excluded.stats,
                updated_at = excluded.updated_at",
        )
        .bind(&profile.address)
        .bind(&profile.display_name)
        .bind(stats)
        .bind(timestamp(&profile.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn append_score(&self, event: &GameScoreEvent) -> Result<()> {
        sqlx::query(
            "INSERT INTO scores
                (id, address, game_type, score, difficulty, reward_tokens, nft_badge_earned, played_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&event.id)
        .bind(&event.player_address)
        .bind(event.game_type.as_str())
        .bind(event.score)
        .bind(&event.difficulty)
        .bind(event.reward_tokens.map(to_i64))
        .bind(&event.nft_badge_earned)
        .bind(timestamp(&event.timestamp))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn score_history(&self, address: &str, limit: usize) -> Result<Vec<GameScoreEvent>> {
        let rows = sqlx::query_as::<_, ScoreRow>(
            "SELECT id, address, game_type, score, difficulty, reward_tokens, nft_badge_earned, played_at
             FROM scores WHERE address = ?
             ORDER BY played_at DESC, seq DESC
             LIMIT ?",
        )
        .bind(address)
        .bind(to_i64(limit as u64))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(GameScoreEvent::try_from).collect()
    }

    async fn leaderboard_record(&self, address: &str) -> Result<Option<LeaderboardRecord>> {
        let row = sqlx::query_as::<_, LeaderboardRow>(
            "SELECT address, display_name, total_score, tokens_earned, badges
             FROM leaderboard WHERE address = ?",
        )
        .bind(address)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(LeaderboardRecord::from))
    }

    async fn upsert_leaderboard(&self, record: &LeaderboardRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO leaderboard (address, display_name, total_score, tokens_earned, badges)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(address) DO UPDATE SET
                display_name = excluded.display_name,
                total_score = excluded.total_score,
                tokens_earned = excluded.tokens_earned,
                badges = excluded.badges",
        )
        .bind(&record.address)
        .bind(&record.display_name)
        .bind(record.total_score)
        .bind(to_i64(record.tokens_earned))
        .bind(i64::from(record.badges))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn leaderboard_records(&self) -> Result<Vec<LeaderboardRecord>> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            "SELECT address, display_name, total_score, tokens_earned, badges
             FROM leaderboard ORDER BY seq ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LeaderboardRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GameType;

    #[tokio::test]
    async fn test_profile_stats_survive_json_roundtrip() {
        let store = SqliteStore::in_memory().await.unwrap();
        let mut profile = PlayerProfile::new("ALGO1");
        profile.stats.games_played = 2;
        profile.stats.tokens_earned = 15;
        profile.stats.add_badge("First Steps");
        profile.stats.last_played = Some(Utc::now());

        store.save_profile(&profile).await.unwrap();
        profile.display_name = "Ada".to_string();
        store.save_profile(&profile).await.unwrap();

        let loaded = store.load_profile("ALGO1").await.unwrap().unwrap();
        assert_eq!(loaded.display_name, "Ada");
        assert_eq!(loaded.stats.nft_badges, vec!["First Steps"]);
        assert_eq!(loaded.stats.tokens_earned, 15);
        assert!(store.load_profile("ALGO2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_score_history_newest_first() {
        let store = SqliteStore::in_memory().await.unwrap();
        let start = Utc::now();
        for i in 0..4 {
            let mut event = GameScoreEvent::new(
                "ALGO1",
                GameType::Trivia,
                60 + i * 10,
                start + chrono::Duration::seconds(i),
            )
            .with_difficulty(Some("hard".to_string()));
            if i == 3 {
                event.reward_tokens = Some(50);
            }
            store.append_score(&event).await.unwrap();
        }

        let history = store.score_history("ALGO1", 2).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].score, 90);
        assert_eq!(history[0].reward_tokens, Some(50));
        assert_eq!(history[0].difficulty.as_deref(), Some("hard"));
        assert_eq!(history[1].score, 80);
        assert!(store.score_history("NOBODY", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_leaderboard_upsert_keeps_position() {
        let store = SqliteStore::in_memory().await.unwrap();
        let mut a = LeaderboardRecord {
            address: "A".to_string(),
            display_name: "Player_A".to_string(),
            total_score: 10,
            tokens_earned: 1,
            badges: 0,
        };
        let b = LeaderboardRecord {
            address: "B".to_string(),
            total_score: 50,
            ..a.clone()
        };

        store.upsert_leaderboard(&a).await.unwrap();
        store.upsert_leaderboard(&b).await.unwrap();
        a.total_score = 90;
        a.badges = 2;
        store.upsert_leaderboard(&a).await.unwrap();

        let records = store.leaderboard_records().await.unwrap();
        let addresses: Vec<&str> = records.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(addresses, vec!["A", "B"]);
        assert_eq!(records[0].total_score, 90);
        assert_eq!(store.leaderboard_record("A").await.unwrap(), Some(a));
    }
}
