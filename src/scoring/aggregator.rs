use chrono::{DateTime, Utc};

use crate::{
    models::{ArcadeError, BestReward, GameScoreEvent, GameType, PlayerStats, Result},
    scoring::TierTable,
};

/// One finished session handed to the aggregator.
#[derive(Debug, Clone)]
pub struct ScoreSubmission {
    pub player_address: Option<String>,
    pub game_type: GameType,
    pub score: i64,
    pub difficulty: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ScoreSubmission {
    pub fn new(player_address: impl Into<String>, game_type: GameType, score: i64) -> Self {
        Self {
            player_address: Some(player_address.into()),
            game_type,
            score,
            difficulty: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Aggregation {
    pub stats: PlayerStats,
    pub reward: BestReward,
    pub event: GameScoreEvent,
    /// Set only when the reward badge was not already owned.
    pub new_badge: Option<String>,
}

/// Fold one submission into `current`, returning the new stats and the reward.
///
/// Every call counts as a distinct game; replaying a submission double counts.
pub fn apply_score(
    current: &PlayerStats,
    tiers: &TierTable,
    submission: &ScoreSubmission,
) -> Result<Aggregation> {
    let address = submission
        .player_address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or(ArcadeError::IdentityMissing)?;

    let score = submission.score.max(0);
    let reward = tiers.evaluate(submission.game_type, score);

    let mut stats = current.clone();
    stats.games_played = stats.games_played.saturating_add(1);
    stats.total_score = stats.total_score.saturating_add(score);
    stats.highest_score = stats.highest_score.max(score);
    stats.tokens_earned = stats.tokens_earned.saturating_add(reward.tokens);
    stats.last_played = Some(submission.timestamp);

    let bucket = stats.game_stats.entry(submission.game_type).or_default();
    bucket.played = bucket.played.saturating_add(1);
    bucket.high_score = bucket.high_score.max(score);
    bucket.total_score = bucket.total_score.saturating_add(score);

    let new_badge = match &reward.badge {
        Some(badge) if stats.add_badge(badge) => Some(badge.clone()),
        _ => None,
    };

    let mut event = GameScoreEvent::new(address, submission.game_type, score, submission.timestamp)
        .with_difficulty(submission.difficulty.clone());
    if reward.tokens > 0 {
        event.reward_tokens = Some(reward.tokens);
        event.nft_badge_earned = reward.badge.clone();
    }

    Ok(Aggregation {
        stats,
        reward,
        event,
        new_badge,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use proptest::prelude::*;

    fn table() -> TierTable {
        TierTable::from_settings(&Settings::default().rewards).unwrap()
    }

    #[test]
    fn test_apply_score_updates_every_counter() {
        let submission = ScoreSubmission::new("ALGO1", GameType::Snake, 120).with_difficulty("hard");
        let out = apply_score(&PlayerStats::default(), &table(), &submission).unwrap();

        assert_eq!(out.stats.games_played, 1);
        assert_eq!(out.stats.total_score, 120);
        assert_eq!(out.stats.highest_score, 120);
        assert_eq!(out.stats.tokens_earned, 10);
        assert_eq!(out.stats.last_played, Some(submission.timestamp));
        assert_eq!(out.stats.game(GameType::Snake).played, 1);
        assert_eq!(out.stats.game(GameType::Trivia).played, 0);

        assert_eq!(out.event.player_address, "ALGO1");
        assert_eq!(out.event.reward_tokens, Some(10));
        assert_eq!(out.event.difficulty.as_deref(), Some("hard"));
        assert!(out.new_badge.is_none());
    }

    #[test]
    fn test_missing_identity_is_rejected() {
        let mut submission = ScoreSubmission::new("", GameType::Snake, 10);
        assert!(matches!(
            apply_score(&PlayerStats::default(), &table(), &submission),
            Err(ArcadeError::IdentityMissing)
        ));

        submission.player_address = None;
        assert!(matches!(
            apply_score(&PlayerStats::default(), &table(), &submission),
            Err(ArcadeError::IdentityMissing)
        ));
    }

    #[test]
    fn test_zero_reward_leaves_event_fields_empty() {
        let submission = ScoreSubmission::new("ALGO1", GameType::Memory, 80);
        let out = apply_score(&PlayerStats::default(), &table(), &submission).unwrap();
        assert_eq!(out.reward, BestReward::none());
        assert!(out.event.reward_tokens.is_none());
        assert!(out.event.nft_badge_earned.is_none());
        assert_eq!(out.stats.total_score, 80);
    }

    #[test]
    fn test_badge_is_only_new_once() {
        let tiers = table();
        let submission = ScoreSubmission::new("ALGO1", GameType::Snake, 600);

        let first = apply_score(&PlayerStats::default(), &tiers, &submission).unwrap();
        assert_eq!(first.new_badge.as_deref(), Some("Snake Master"));

        let second = apply_score(&first.stats, &tiers, &submission).unwrap();
        assert!(second.new_badge.is_none());
        assert_eq!(second.stats.nft_badges, vec!["Snake Master"]);
        assert_eq!(second.event.nft_badge_earned.as_deref(), Some("Snake Master"));
    }

    #[test]
    fn test_negative_score_never_decrements() {
        let tiers = table();
        let seeded = apply_score(
            &PlayerStats::default(),
            &tiers,
            &ScoreSubmission::new("ALGO1", GameType::Snake, 30),
        )
        .unwrap();
        let out = apply_score(&seeded.stats, &tiers, &ScoreSubmission::new("ALGO1", GameType::Snake, -50)).unwrap();
        assert_eq!(out.stats.total_score, 30);
        assert_eq!(out.stats.games_played, 2);
        assert_eq!(out.event.score, 0);
    }

    #[test]
    fn test_huge_scores_saturate_instead_of_wrapping() {
        let tiers = table();
        let submission = ScoreSubmission::new("ALGO1", GameType::Game2048, i64::MAX);
        let first = apply_score(&PlayerStats::default(), &tiers, &submission).unwrap();
        let second = apply_score(&first.stats, &tiers, &submission).unwrap();

        assert_eq!(second.stats.total_score, i64::MAX);
        assert_eq!(second.stats.game(GameType::Game2048).total_score, i64::MAX);
        assert_eq!(second.stats.games_played, 2);
    }

    proptest! {
        #[test]
        fn prop_repeated_submission_is_linear(score in -20i64..1_000, n in 1u64..20) {
            let tiers = table();
            let submission = ScoreSubmission::new("ALGO1", GameType::Trivia, score);
            let mut stats = PlayerStats::default();
            for _ in 0..n {
                stats = apply_score(&stats, &tiers, &submission).unwrap().stats;
            }
            let clamped = score.max(0);
            prop_assert_eq!(stats.games_played, n);
            prop_assert_eq!(stats.total_score, clamped * n as i64);
            prop_assert_eq!(stats.game(GameType::Trivia).played, n);
            prop_assert_eq!(stats.tokens_earned, tiers.evaluate(GameType::Trivia, clamped).tokens * n);
            prop_assert!(stats.nft_badges.len() <= 1);
        }
    }
}
