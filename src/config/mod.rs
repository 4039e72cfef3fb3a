pub mod settings;

pub use settings::{
    default_reward_tiers, AiTuning, ApiSettings, AppSettings, CacheSettings, DatabaseSettings,
    Environment, IssuanceSettings, LedgerSettings, RewardSettings, Settings, TicTacToeSettings,
};
