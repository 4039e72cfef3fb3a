use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Snake,
    Trivia,
    #[serde(rename = "tictactoe")]
    TicTacToe,
    Memory,
    Rps,
    Flappy,
    Puzzle15,
    Simon,
    Sudoku,
    Chess,
    Game2048,
}

impl GameType {
    pub const ALL: [GameType; 11] = [
        GameType::Snake,
        GameType::Trivia,
        GameType::TicTacToe,
        GameType::Memory,
        GameType::Rps,
        GameType::Flappy,
        GameType::Puzzle15,
        GameType::Simon,
        GameType::Sudoku,
        GameType::Chess,
        GameType::Game2048,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Snake => "snake",
            GameType::Trivia => "trivia",
            GameType::TicTacToe => "tictactoe",
            GameType::Memory => "memory",
            GameType::Rps => "rps",
            GameType::Flappy => "flappy",
            GameType::Puzzle15 => "puzzle15",
            GameType::Simon => "simon",
            GameType::Sudoku => "sudoku",
            GameType::Chess => "chess",
            GameType::Game2048 => "game2048",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "snake" => Some(GameType::Snake),
            "trivia" => Some(GameType::Trivia),
            "tictactoe" | "tic-tac-toe" => Some(GameType::TicTacToe),
            "memory" => Some(GameType::Memory),
            "rps" => Some(GameType::Rps),
            "flappy" => Some(GameType::Flappy),
            "puzzle15" | "15puzzle" => Some(GameType::Puzzle15),
            "simon" => Some(GameType::Simon),
            "sudoku" => Some(GameType::Sudoku),
            "chess" => Some(GameType::Chess),
            "game2048" | "2048" => Some(GameType::Game2048),
            _ => None,
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Unrecognized labels (e.g. "normal") fall back to medium.
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
