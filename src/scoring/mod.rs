pub mod tiers;
pub mod aggregator;
pub mod leaderboard;

pub use tiers::{evaluate, TierTable};
pub use aggregator::{apply_score, Aggregation, ScoreSubmission};
pub use leaderboard::{project, project_profiles, upsert};
