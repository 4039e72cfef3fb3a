pub mod models;
pub mod config;
pub mod scoring;
pub mod games;
pub mod ledger;
pub mod rewards;
pub mod store;
pub mod service;
pub mod api;

pub use models::{ArcadeError, GameType, PlayerProfile, PlayerStats, Result};
pub use config::Settings;
pub use service::{ArcadeService, ScoreOutcome};

// Re-export commonly used types
pub use rust_decimal::Decimal;
