use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{default_display_name, ArcadeError, PlayerProfile, PlayerStats, Result};

/// Stored leaderboard row, one per address, kept in first-arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRecord {
    pub address: String,
    pub display_name: String,
    pub total_score: i64,
    pub tokens_earned: u64,
    pub badges: u32,
}

impl LeaderboardRecord {
    pub fn from_profile(profile: &PlayerProfile) -> Self {
        Self {
            address: profile.address.clone(),
            display_name: profile.display_name.clone(),
            total_score: profile.stats.total_score,
            tokens_earned: profile.stats.tokens_earned,
            badges: profile.stats.nft_badges.len() as u32,
        }
    }

    /// Move the row forward by what one in-process game added to `before`.
    ///
    /// Totals contributed through HTTP submissions stay in place.
    pub fn advance(existing: Option<&LeaderboardRecord>, before: &PlayerStats, after: &PlayerProfile) -> Self {
        let Some(existing) = existing else {
            return Self::from_profile(after);
        };

        let stats = &after.stats;
        let badges_gained = stats.nft_badges.len().saturating_sub(before.nft_badges.len());
        Self {
            address: after.address.clone(),
            display_name: after.display_name.clone(),
            total_score: existing
                .total_score
                .saturating_add(stats.total_score.saturating_sub(before.total_score).max(0)),
            tokens_earned: existing
                .tokens_earned
                .saturating_add(stats.tokens_earned.saturating_sub(before.tokens_earned)),
            badges: existing
                .badges
                .saturating_add(u32::try_from(badges_gained).unwrap_or(u32::MAX)),
        }
    }

    /// Fold an HTTP submission into the existing row (or a fresh one).
    pub fn accumulate(existing: Option<&LeaderboardRecord>, request: &SubmitScoreRequest) -> Self {
        let display_name = request
            .display_name
            .clone()
            .or_else(|| existing.map(|r| r.display_name.clone()))
            .unwrap_or_else(|| default_display_name(&request.address));

        Self {
            address: request.address.clone(),
            display_name,
            total_score: existing
                .map_or(0, |r| r.total_score)
                .saturating_add(request.score),
            tokens_earned: existing
                .map_or(0, |r| r.tokens_earned)
                .saturating_add(request.tokens_earned),
            badges: existing
                .map_or(0, |r| r.badges)
                .saturating_add(request.badges_awarded),
        }
    }
}

/// Ranked, read-only projection row. Serialized as `LeaderboardEntryDTO`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub address: String,
    pub display_name: String,
    pub total_score: i64,
    pub tokens_earned: u64,
    pub badges: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetLeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Raw `POST /api/leaderboard/submit` body before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScorePayload {
    pub address: Option<String>,
    pub display_name: Option<String>,
    pub game_type: Option<String>,
    pub score: Option<serde_json::Value>,
    pub tokens_earned: Option<serde_json::Value>,
    pub badges_awarded: Option<serde_json::Value>,
}

/// Validated submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitScoreRequest {
    pub address: String,
    pub display_name: Option<String>,
    pub game_type: String,
    pub score: i64,
    pub tokens_earned: u64,
    pub badges_awarded: u32,
}

impl SubmitScorePayload {
    pub fn validate(self) -> Result<SubmitScoreRequest> {
        let address = self
            .address
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| ArcadeError::Validation("address is required".to_string()))?;

        let score = match self.score {
            Some(serde_json::Value::Number(n)) => score_from_number(&n)
                .ok_or_else(|| ArcadeError::Validation("score must be a finite number".to_string()))?,
            _ => return Err(ArcadeError::Validation("score must be a number".to_string())),
        };

        Ok(SubmitScoreRequest {
            address,
            display_name: self.display_name.filter(|n| !n.trim().is_empty()),
            game_type: self.game_type.unwrap_or_default(),
            score,
            tokens_earned: delta_from_value(self.tokens_earned.as_ref()),
            badges_awarded: delta_from_value(self.badges_awarded.as_ref())
                .try_into()
                .unwrap_or(u32::MAX),
        })
    }
}

/// Integers pass through, fractions truncate toward zero, negatives clamp to 0.
fn score_from_number(n: &serde_json::Number) -> Option<i64> {
    let raw = if let Some(i) = n.as_i64() {
        i
    } else if n.as_u64().is_some() {
        i64::MAX
    } else {
        let f = n.as_f64()?;
        if !f.is_finite() {
            return None;
        }
        f.trunc() as i64
    };
    Some(raw.max(0))
}

/// Optional counters are never grounds for rejection: anything that is not a
/// usable number counts as zero.
fn delta_from_value(value: Option<&serde_json::Value>) -> u64 {
    match value {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| score_from_number(n).map(|v| v as u64))
            .unwrap_or(0),
        _ => 0,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmitScoreResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SubmitScoreResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalanceResponse {
    pub address: String,
    pub micro_algos: u64,
    pub algos: Decimal,
}
