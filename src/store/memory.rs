use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::{
    models::{GameScoreEvent, LeaderboardRecord, PlayerProfile, Result},
    scoring::upsert,
    store::ArcadeStore,
};

/// Process-local store, used by tests and the offline CLI paths.
#[derive(Default)]
pub struct MemoryStore {
    profiles: RwLock<HashMap<String, PlayerProfile>>,
    history: RwLock<HashMap<String, Vec<GameScoreEvent>>>,
    leaderboard: RwLock<Vec<LeaderboardRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArcadeStore for MemoryStore {
    async fn load_profile(&self, address: &str) -> Result<Option<PlayerProfile>> {
        Ok(self.profiles.read().await.get(address).cloned())
    }

    async fn save_profile(&self, profile: &PlayerProfile) -> Result<()> {
        self.profiles
            .write()
            .await
            .insert(profile.address.clone(), profile.clone());
        Ok(())
    }

    async fn append_score(&self, event: &GameScoreEvent) -> Result<()> {
        self.history
            .write()
            .await
            .entry(event.player_address.clone())
            .or_default()
            .push(event.clone());
        Ok(())
    }

    async fn score_history(&self, address: &str, limit: usize) -> Result<Vec<GameScoreEvent>> {
        let history = self.history.read().await;
        let mut events: Vec<GameScoreEvent> = history
            .get(address)
            .map(|events| events.iter().rev().cloned().collect())
            .unwrap_or_default();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events.truncate(limit);
        Ok(events)
    }

    async fn leaderboard_record(&self, address: &str) -> Result<Option<LeaderboardRecord>> {
        Ok(self
            .leaderboard
            .read()
            .await
            .iter()
            .find(|r| r.address == address)
            .cloned())
    }

    async fn upsert_leaderboard(&self, record: &LeaderboardRecord) -> Result<()> {
        upsert(&mut *self.leaderboard.write().await, record.clone());
        Ok(())
    }

    async fn leaderboard_records(&self) -> Result<Vec<LeaderboardRecord>> {
        Ok(self.leaderboard.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GameType;
    use chrono::{Duration, Utc};

    fn record(address: &str, total_score: i64) -> LeaderboardRecord {
        LeaderboardRecord {
            address: address.to_string(),
            display_name: format!("Player_{}", address),
            total_score,
            tokens_earned: 0,
            badges: 0,
        }
    }

    #[tokio::test]
    async fn test_profile_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.load_profile("ALGO1").await.unwrap().is_none());

        let mut profile = PlayerProfile::new("ALGO1");
        profile.stats.games_played = 3;
        store.save_profile(&profile).await.unwrap();

        assert_eq!(store.load_profile("ALGO1").await.unwrap(), Some(profile));
    }

    #[tokio::test]
    async fn test_history_is_newest_first_and_limited() {
        let store = MemoryStore::new();
        let start = Utc::now();
        for i in 0..5 {
            let event = GameScoreEvent::new("ALGO1", GameType::Snake, i * 10, start + Duration::seconds(i));
            store.append_score(&event).await.unwrap();
        }
        store
            .append_score(&GameScoreEvent::new("ALGO2", GameType::Snake, 999, start))
            .await
            .unwrap();

        let history = store.score_history("ALGO1", 3).await.unwrap();
        let scores: Vec<i64> = history.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![40, 30, 20]);
    }

    #[tokio::test]
    async fn test_leaderboard_keeps_arrival_order() {
        let store = MemoryStore::new();
        store.upsert_leaderboard(&record("A", 10)).await.unwrap();
        store.upsert_leaderboard(&record("B", 50)).await.unwrap();
        store.upsert_leaderboard(&record("A", 70)).await.unwrap();

        let records = store.leaderboard_records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].address, "A");
        assert_eq!(records[0].total_score, 70);
        assert_eq!(store.leaderboard_record("B").await.unwrap().unwrap().total_score, 50);
    }
}
