use serde::{Deserialize, Serialize};

/// A `(min_score, tokens, badge?)` threshold rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardTier {
    pub min_score: i64,
    pub tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

impl RewardTier {
    pub fn new(min_score: i64, tokens: u64) -> Self {
        Self {
            min_score,
            tokens,
            badge: None,
        }
    }

    pub fn with_badge(mut self, badge: impl Into<String>) -> Self {
        self.badge = Some(badge.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BestReward {
    pub tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

impl BestReward {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens == 0 && self.badge.is_none()
    }
}

impl From<&RewardTier> for BestReward {
    fn from(tier: &RewardTier) -> Self {
        Self {
            tokens: tier.tokens,
            badge: tier.badge.clone(),
        }
    }
}
