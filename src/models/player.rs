use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::GameType;

/// One completed session. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameScoreEvent {
    pub id: String,
    pub game_type: GameType,
    pub score: i64,
    pub timestamp: DateTime<Utc>,
    pub player_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nft_badge_earned: Option<String>,
}

impl GameScoreEvent {
    pub fn new(
        player_address: impl Into<String>,
        game_type: GameType,
        score: i64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Self::generate_id(timestamp),
            game_type,
            score,
            timestamp,
            player_address: player_address.into(),
            difficulty: None,
            reward_tokens: None,
            nft_badge_earned: None,
        }
    }

    pub fn with_difficulty(mut self, difficulty: Option<String>) -> Self {
        self.difficulty = difficulty;
        self
    }

    fn generate_id(timestamp: DateTime<Utc>) -> String {
        let suffix: u64 = rand::thread_rng().gen();
        format!("{}_{:016x}", timestamp.timestamp_millis(), suffix)
    }
}

/// Per-game bucket inside [`PlayerStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub played: u64,
    pub high_score: i64,
    pub total_score: i64,
}

/// Cumulative per-player aggregate. Only grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub total_score: i64,
    pub games_played: u64,
    pub highest_score: i64,
    pub tokens_earned: u64,
    /// Insertion-ordered, no duplicates.
    pub nft_badges: Vec<String>,
    pub last_played: Option<DateTime<Utc>>,
    pub game_stats: BTreeMap<GameType, GameStats>,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            total_score: 0,
            games_played: 0,
            highest_score: 0,
            tokens_earned: 0,
            nft_badges: Vec::new(),
            last_played: None,
            game_stats: GameType::ALL
                .iter()
                .map(|game| (*game, GameStats::default()))
                .collect(),
        }
    }
}

impl PlayerStats {
    pub fn game(&self, game_type: GameType) -> GameStats {
        self.game_stats.get(&game_type).copied().unwrap_or_default()
    }

    pub fn has_badge(&self, badge: &str) -> bool {
        self.nft_badges.iter().any(|b| b == badge)
    }

    /// Set-union insert. Returns true when the badge was not owned yet.
    pub fn add_badge(&mut self, badge: &str) -> bool {
        if self.has_badge(badge) {
            return false;
        }
        self.nft_badges.push(badge.to_string());
        true
    }
}

/// Everything persisted for one wallet address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub address: String,
    pub display_name: String,
    pub stats: PlayerStats,
    pub updated_at: DateTime<Utc>,
}

impl PlayerProfile {
    pub fn new(address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            display_name: default_display_name(&address),
            address,
            stats: PlayerStats::default(),
            updated_at: Utc::now(),
        }
    }
}

/// `Player_<last four characters of the address>`.
pub fn default_display_name(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    let start = chars.len().saturating_sub(4);
    let tail: String = chars[start..].iter().collect();
    format!("Player_{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_stats_have_every_game_bucket() {
        let stats = PlayerStats::default();
        assert_eq!(stats.game_stats.len(), GameType::ALL.len());
        assert_eq!(stats.game(GameType::Chess), GameStats::default());
        assert!(stats.last_played.is_none());
    }

    #[test]
    fn test_badges_are_a_set() {
        let mut stats = PlayerStats::default();
        assert!(stats.add_badge("Snake Master"));
        assert!(!stats.add_badge("Snake Master"));
        assert!(stats.add_badge("First Steps"));
        assert_eq!(stats.nft_badges, vec!["Snake Master", "First Steps"]);
    }

    #[test]
    fn test_default_display_name() {
        assert_eq!(default_display_name("ALGOXYZ1234"), "Player_1234");
        assert_eq!(default_display_name("AB"), "Player_AB");
    }

    #[test]
    fn test_stats_json_uses_camel_case_and_game_names() {
        let stats = PlayerStats::default();
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("gamesPlayed").is_some());
        assert!(json["gameStats"].get("tictactoe").is_some());

        let back: PlayerStats = serde_json::from_value(json).unwrap();
        assert_eq!(back, stats);
    }
}
