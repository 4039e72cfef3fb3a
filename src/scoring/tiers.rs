use std::collections::HashMap;

use crate::{
    config::RewardSettings,
    models::{ArcadeError, BestReward, GameType, Result, RewardTier},
};

/// Best reward earned by `score` against an unordered tier list.
///
/// Negative scores are treated as 0. Among the tiers whose threshold is met,
/// the one with the highest `min_score` wins; ties fall to more tokens, then to
/// a present badge, then to the lexically greater badge name.
pub fn evaluate(score: i64, tiers: &[RewardTier]) -> BestReward {
    let score = score.max(0);

    tiers
        .iter()
        .filter(|tier| score >= tier.min_score)
        .max_by(|a, b| {
            (a.min_score, a.tokens, &a.badge).cmp(&(b.min_score, b.tokens, &b.badge))
        })
        .map(BestReward::from)
        .unwrap_or_default()
}

/// Per-game reward tiers, built from settings.
#[derive(Debug, Clone, Default)]
pub struct TierTable {
    tiers: HashMap<GameType, Vec<RewardTier>>,
}

impl TierTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &RewardSettings) -> Result<Self> {
        let mut table = Self::new();
        for (name, tiers) in &settings.tiers {
            let game = GameType::from_str(name)
                .ok_or_else(|| ArcadeError::UnknownGame(name.clone()))?;
            table.set(game, tiers.clone());
        }
        Ok(table)
    }

    pub fn with_tiers(mut self, game_type: GameType, tiers: Vec<RewardTier>) -> Self {
        self.set(game_type, tiers);
        self
    }

    pub fn set(&mut self, game_type: GameType, tiers: Vec<RewardTier>) {
        self.tiers.insert(game_type, tiers);
    }

    /// Games without a configured list get an empty one.
    pub fn tiers_for(&self, game_type: GameType) -> &[RewardTier] {
        self.tiers.get(&game_type).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn evaluate(&self, game_type: GameType, score: i64) -> BestReward {
        evaluate(score, self.tiers_for(game_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use proptest::prelude::*;

    fn scenario_tiers() -> Vec<RewardTier> {
        vec![
            RewardTier::new(50, 5),
            RewardTier::new(100, 10),
            RewardTier::new(200, 25),
        ]
    }

    #[test]
    fn test_scenario_thresholds() {
        let tiers = scenario_tiers();
        assert_eq!(evaluate(150, &tiers), BestReward { tokens: 10, badge: None });
        assert_eq!(evaluate(49, &tiers), BestReward::none());
        assert_eq!(evaluate(200, &tiers), BestReward { tokens: 25, badge: None });
    }

    #[test]
    fn test_unsorted_tiers_pick_highest_threshold() {
        let mut tiers = scenario_tiers();
        tiers.reverse();
        assert_eq!(evaluate(250, &tiers).tokens, 25);
        assert_eq!(evaluate(120, &tiers).tokens, 10);
    }

    #[test]
    fn test_negative_score_is_clamped() {
        let tiers = vec![RewardTier::new(-10, 1), RewardTier::new(0, 2)];
        assert_eq!(evaluate(-500, &tiers).tokens, 2);
        assert_eq!(evaluate(-1, &[]), BestReward::none());
    }

    #[test]
    fn test_equal_thresholds_prefer_tokens_then_badge() {
        let tiers = vec![
            RewardTier::new(10, 3),
            RewardTier::new(10, 7),
            RewardTier::new(10, 7).with_badge("High Scorer"),
        ];
        let reward = evaluate(10, &tiers);
        assert_eq!(reward.tokens, 7);
        assert_eq!(reward.badge.as_deref(), Some("High Scorer"));
    }

    #[test]
    fn test_default_table_badges() {
        let table = TierTable::from_settings(&Settings::default().rewards).unwrap();
        let snake = table.evaluate(GameType::Snake, 520);
        assert_eq!(snake.tokens, 50);
        assert_eq!(snake.badge.as_deref(), Some("Snake Master"));

        assert_eq!(table.evaluate(GameType::TicTacToe, 4).tokens, 3);
        assert_eq!(table.evaluate(GameType::Trivia, 100).badge.as_deref(), Some("Trivia Champion"));
    }

    #[test]
    fn test_unconfigured_game_earns_nothing() {
        let table = TierTable::from_settings(&Settings::default().rewards).unwrap();
        assert!(table.tiers_for(GameType::Sudoku).is_empty());
        assert_eq!(table.evaluate(GameType::Sudoku, 10_000), BestReward::none());
    }

    #[test]
    fn test_unknown_game_name_is_rejected() {
        let mut rewards = Settings::default().rewards;
        rewards.tiers.insert("pinball".to_string(), vec![]);
        assert!(matches!(
            TierTable::from_settings(&rewards),
            Err(ArcadeError::UnknownGame(_))
        ));
    }

    /// Tier lists where tokens never drop as the threshold rises.
    fn well_formed_tiers() -> impl Strategy<Value = Vec<RewardTier>> {
        prop::collection::vec(
            (-50i64..500, 0u64..20, prop::option::of("[A-C]")),
            0..8,
        )
        .prop_map(|mut raw| {
            raw.sort_by_key(|(min, _, _)| *min);
            let mut tokens = 0;
            raw.into_iter()
                .map(|(min_score, step, badge)| {
                    tokens += step;
                    RewardTier { min_score, tokens, badge }
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_tokens_are_monotonic_in_score(
            tiers in well_formed_tiers(),
            a in -100i64..700,
            b in -100i64..700,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(evaluate(lo, &tiers).tokens <= evaluate(hi, &tiers).tokens);
        }

        #[test]
        fn prop_result_ignores_tier_order(
            (tiers, shuffled) in well_formed_tiers()
                .prop_flat_map(|t| (Just(t.clone()), Just(t).prop_shuffle())),
            score in -100i64..700,
        ) {
            prop_assert_eq!(evaluate(score, &tiers), evaluate(score, &shuffled));
        }
    }
}
