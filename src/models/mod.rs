pub mod error;
pub mod game;
pub mod reward;
pub mod player;
pub mod leaderboard;
pub mod cache;

pub use error::*;
pub use game::*;
pub use reward::*;
pub use player::*;
pub use leaderboard::*;
pub use cache::*;
