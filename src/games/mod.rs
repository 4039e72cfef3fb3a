//! Game session kernels.
//!
//! Each game is a state machine driven by [`GameSession::handle`]. Real-time
//! games take a `Tick` input; [`scheduler::drive`] feeds those on a timer.

pub mod scheduler;
pub mod snake;
pub mod trivia;
pub mod tictactoe;
pub mod memory;
pub mod rps;
pub mod flappy;
pub mod puzzle15;
pub mod simon;
pub mod sudoku;
pub mod chess;
pub mod game2048;

use serde::{Deserialize, Serialize};

use crate::models::{Difficulty, GameType};
use crate::scoring::ScoreSubmission;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Menu,
    Playing,
    Paused,
    /// Between rounds or questions, waiting for the player to continue.
    Intermission,
    GameOver,
}

/// Final outcome of one playthrough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub game_type: GameType,
    pub score: i64,
    pub difficulty: Option<Difficulty>,
}

impl SessionResult {
    pub fn new(game_type: GameType, score: i64) -> Self {
        Self {
            game_type,
            score,
            difficulty: None,
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn submission(&self, player_address: impl Into<String>) -> ScoreSubmission {
        let submission = ScoreSubmission::new(player_address, self.game_type, self.score);
        match self.difficulty {
            Some(difficulty) => submission.with_difficulty(difficulty.as_str()),
            None => submission,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Input not valid in the current phase; state unchanged.
    Ignored,
    Updated,
    Finished(SessionResult),
}

impl Transition {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Transition::Ignored)
    }

    pub fn result(self) -> Option<SessionResult> {
        match self {
            Transition::Finished(result) => Some(result),
            _ => None,
        }
    }
}

pub trait GameSession: Send {
    type Input: Send;

    fn game_type(&self) -> GameType;
    fn phase(&self) -> Phase;
    fn score(&self) -> i64;
    fn handle(&mut self, input: Self::Input) -> Transition;
}

pub use scheduler::drive;
