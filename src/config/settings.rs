use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, File};
use std::collections::HashMap;
use std::path::Path;

use crate::models::{GameType, RewardTier};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub app: AppSettings,
    pub rewards: RewardSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub api: ApiSettings,
    pub ledger: LedgerSettings,
    pub issuance: IssuanceSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub version: String,
    pub log_level: String,
    pub environment: Environment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardSettings {
    /// Tier lists keyed by game name ("snake", "trivia", ...)
    pub tiers: HashMap<String, Vec<RewardTier>>,
    pub tictactoe: TicTacToeSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicTacToeSettings {
    pub easy: AiTuning,
    pub medium: AiTuning,
    pub hard: AiTuning,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AiTuning {
    pub max_depth: u8,
    pub mistake_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    pub balance_ttl_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSettings {
    pub algod_url: String,
    pub algod_token: String,
    pub timeout_seconds: u64,
    pub confirmation_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuanceSettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub call_timeout_ms: u64,
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub open_timeout_seconds: u64,
    /// Confirmed reward attempts kept for lookup; the oldest go first.
    pub confirmed_log_capacity: usize,
}

pub fn default_reward_tiers() -> HashMap<String, Vec<RewardTier>> {
    let mut tiers = HashMap::new();

    tiers.insert(
        GameType::Snake.as_str().to_string(),
        vec![
            RewardTier::new(50, 5),
            RewardTier::new(100, 10),
            RewardTier::new(200, 25),
            RewardTier::new(500, 50).with_badge("Snake Master"),
        ],
    );

    tiers.insert(
        GameType::Trivia.as_str().to_string(),
        vec![
            RewardTier::new(60, 10),
            RewardTier::new(80, 20),
            RewardTier::new(90, 50),
            RewardTier::new(100, 100).with_badge("Trivia Champion"),
        ],
    );

    tiers.insert(
        GameType::TicTacToe.as_str().to_string(),
        vec![
            RewardTier::new(3, 3),
            RewardTier::new(5, 8),
            RewardTier::new(10, 20),
            RewardTier::new(25, 50).with_badge("Strategy Master"),
        ],
    );

    tiers
}

impl Default for TicTacToeSettings {
    fn default() -> Self {
        Self {
            easy: AiTuning { max_depth: 3, mistake_rate: 0.3 },
            medium: AiTuning { max_depth: 6, mistake_rate: 0.1 },
            hard: AiTuning { max_depth: 9, mistake_rate: 0.0 },
        }
    }
}

impl Default for IssuanceSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 200,
            max_delay_ms: 5_000,
            backoff_multiplier: 2.0,
            call_timeout_ms: 10_000,
            failure_threshold: 5,
            success_threshold: 2,
            open_timeout_seconds: 60,
            confirmed_log_capacity: 10_000,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: "Arcade Hub".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                log_level: "info".to_string(),
                environment: Environment::Development,
            },
            rewards: RewardSettings {
                tiers: default_reward_tiers(),
                tictactoe: TicTacToeSettings::default(),
            },
            database: DatabaseSettings {
                url: "sqlite://arcade_hub.db".to_string(),
                max_connections: 5,
                connect_timeout_seconds: 30,
            },
            cache: CacheSettings {
                balance_ttl_seconds: 30,
            },
            api: ApiSettings {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            ledger: LedgerSettings {
                algod_url: "https://testnet-api.algonode.cloud".to_string(),
                algod_token: String::new(),
                timeout_seconds: 10,
                confirmation_delay_ms: 2_000,
            },
            issuance: IssuanceSettings::default(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("ARCADE").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::from(path.as_ref()))
            .build()?;

        s.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        for (game, tiers) in &self.rewards.tiers {
            if GameType::from_str(game).is_none() {
                return Err(format!("Reward tiers configured for unknown game '{}'", game));
            }

            let mut sorted: Vec<&RewardTier> = tiers.iter().collect();
            sorted.sort_by_key(|t| (t.min_score, t.tokens));
            if sorted.windows(2).any(|w| w[1].tokens < w[0].tokens) {
                return Err(format!(
                    "Reward tiers for '{}' must not pay fewer tokens at a higher min_score",
                    game
                ));
            }
        }

        let ttt = &self.rewards.tictactoe;
        for (label, tuning) in [("easy", ttt.easy), ("medium", ttt.medium), ("hard", ttt.hard)] {
            if !(0.0..=1.0).contains(&tuning.mistake_rate) {
                return Err(format!("Tic-tac-toe {} mistake_rate must be between 0 and 1", label));
            }
        }

        if self.issuance.max_attempts == 0 {
            return Err("issuance.max_attempts must be at least 1".to_string());
        }

        if self.issuance.backoff_multiplier < 1.0 {
            return Err("issuance.backoff_multiplier must be >= 1".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.rewards.tiers.len(), 3);
        assert_eq!(settings.ledger.algod_url, "https://testnet-api.algonode.cloud");
    }

    #[test]
    fn test_rejects_unknown_game() {
        let mut settings = Settings::default();
        settings.rewards.tiers.insert("pinball".to_string(), vec![RewardTier::new(1, 1)]);
        assert!(settings.validate().unwrap_err().contains("pinball"));
    }

    #[test]
    fn test_rejects_tiers_that_pay_less_for_more() {
        let mut settings = Settings::default();
        settings.rewards.tiers.insert(
            "memory".to_string(),
            vec![RewardTier::new(100, 5), RewardTier::new(50, 10)],
        );
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_mistake_rate_and_retry_policy() {
        let mut settings = Settings::default();
        settings.rewards.tictactoe.easy.mistake_rate = 1.5;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.issuance.max_attempts = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.issuance.backoff_multiplier = 0.5;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_from_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("arcade_hub_settings_{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
[api]
port = 9090

[rewards.tiers]
memory = [ { minScore = 40, tokens = 4 }, { minScore = 80, tokens = 9, badge = "First Steps" } ]
"#,
        )
        .unwrap();

        let settings = Settings::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.api.port, 9090);
        assert_eq!(settings.api.host, "0.0.0.0");
        let memory = &settings.rewards.tiers["memory"];
        assert_eq!(memory.len(), 2);
        assert_eq!(memory[1].badge.as_deref(), Some("First Steps"));
        assert!(settings.validate().is_ok());
    }
}
