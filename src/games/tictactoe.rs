//! Tic-tac-toe against a depth-limited minimax opponent.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{GameSession, Phase, SessionResult, Transition};
use crate::config::{AiTuning, TicTacToeSettings};
use crate::models::{Difficulty, GameType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    /// Human, moves first.
    X,
    /// AI.
    O,
}

pub type Board = [Option<Mark>; 9];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win(Mark),
    Draw,
}

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

pub fn outcome(board: &Board) -> Option<Outcome> {
    for [a, b, c] in LINES {
        if let Some(mark) = board[a] {
            if board[b] == Some(mark) && board[c] == Some(mark) {
                return Some(Outcome::Win(mark));
            }
        }
    }

    if board.iter().all(Option::is_some) {
        Some(Outcome::Draw)
    } else {
        None
    }
}

pub fn empty_cells(board: &Board) -> Vec<usize> {
    (0..9).filter(|&i| board[i].is_none()).collect()
}

/// Value of `board` for O: `10 - depth` for an O win, `depth - 10` for an X
/// win, 0 for a draw or once `depth` reaches `max_depth`.
pub fn minimax(board: &mut Board, depth: u8, maximizing: bool, max_depth: u8) -> i32 {
    match outcome(board) {
        Some(Outcome::Win(Mark::O)) => return 10 - i32::from(depth),
        Some(Outcome::Win(Mark::X)) => return i32::from(depth) - 10,
        Some(Outcome::Draw) => return 0,
        None if depth >= max_depth => return 0,
        None => {}
    }

    let (mark, mut best) = if maximizing {
        (Mark::O, i32::MIN)
    } else {
        (Mark::X, i32::MAX)
    };

    for cell in 0..9 {
        if board[cell].is_some() {
            continue;
        }
        board[cell] = Some(mark);
        let score = minimax(board, depth + 1, !maximizing, max_depth);
        board[cell] = None;

        best = if maximizing { best.max(score) } else { best.min(score) };
    }
    best
}

/// Minimax-optimal reply for O. The lowest-index cell wins ties.
pub fn best_move(board: &Board, max_depth: u8) -> Option<usize> {
    let mut scratch = *board;
    let mut best: Option<(usize, i32)> = None;

    for cell in empty_cells(board) {
        scratch[cell] = Some(Mark::O);
        let score = minimax(&mut scratch, 0, false, max_depth);
        scratch[cell] = None;

        if best.map_or(true, |(_, top)| score > top) {
            best = Some((cell, score));
        }
    }
    best.map(|(cell, _)| cell)
}

/// The O player: minimax with an occasional uniformly random move.
#[derive(Debug, Clone, Copy)]
pub struct Opponent {
    pub tuning: AiTuning,
}

impl Opponent {
    pub fn new(tuning: AiTuning) -> Self {
        Self { tuning }
    }

    pub fn choose<R: Rng>(&self, board: &Board, rng: &mut R) -> Option<usize> {
        let open = empty_cells(board);
        if open.is_empty() {
            return None;
        }

        let mistake_rate = self.tuning.mistake_rate.clamp(0.0, 1.0);
        if mistake_rate > 0.0 && rng.gen_bool(mistake_rate) {
            return open.choose(rng).copied();
        }
        best_move(board, self.tuning.max_depth)
    }
}

pub fn tuning_for(settings: &TicTacToeSettings, difficulty: Difficulty) -> AiTuning {
    match difficulty {
        Difficulty::Easy => settings.easy,
        Difficulty::Medium => settings.medium,
        Difficulty::Hard => settings.hard,
    }
}

/// Wins, losses and draws across the rounds of one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub streak: u32,
}

impl MatchRecord {
    /// Record a finished round and return its score.
    pub fn record(&mut self, outcome: Outcome, difficulty: Difficulty) -> i64 {
        match outcome {
            Outcome::Win(Mark::X) => {
                self.wins += 1;
                self.streak += 1;
                let base = match difficulty {
                    Difficulty::Easy => 1,
                    Difficulty::Medium => 3,
                    Difficulty::Hard => 5,
                };
                base + i64::from(self.streak)
            }
            Outcome::Win(Mark::O) => {
                self.losses += 1;
                self.streak = 0;
                0
            }
            Outcome::Draw => {
                self.draws += 1;
                1
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicTacToeInput {
    Start,
    SetDifficulty(Difficulty),
    Play(usize),
}

#[derive(Debug, Clone)]
pub struct TicTacToeGame {
    rng: StdRng,
    phase: Phase,
    board: Board,
    difficulty: Difficulty,
    settings: TicTacToeSettings,
    record: MatchRecord,
    last_outcome: Option<Outcome>,
    score: i64,
}

impl TicTacToeGame {
    pub fn new(seed: u64, difficulty: Difficulty) -> Self {
        Self::with_settings(seed, difficulty, TicTacToeSettings::default())
    }

    pub fn with_settings(seed: u64, difficulty: Difficulty, settings: TicTacToeSettings) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            phase: Phase::Menu,
            board: [None; 9],
            difficulty,
            settings,
            record: MatchRecord::default(),
            last_outcome: None,
            score: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn record(&self) -> MatchRecord {
        self.record
    }

    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn finish(&mut self, outcome: Outcome) -> Transition {
        self.score = self.record.record(outcome, self.difficulty);
        self.last_outcome = Some(outcome);
        self.phase = Phase::GameOver;
        Transition::Finished(
            SessionResult::new(GameType::TicTacToe, self.score).with_difficulty(self.difficulty),
        )
    }

    fn play(&mut self, cell: usize) -> Transition {
        if cell >= 9 || self.board[cell].is_some() {
            return Transition::Ignored;
        }
        self.board[cell] = Some(Mark::X);
        if let Some(result) = outcome(&self.board) {
            return self.finish(result);
        }

        let opponent = Opponent::new(tuning_for(&self.settings, self.difficulty));
        if let Some(reply) = opponent.choose(&self.board, &mut self.rng) {
            self.board[reply] = Some(Mark::O);
        }
        match outcome(&self.board) {
            Some(result) => self.finish(result),
            None => Transition::Updated,
        }
    }
}

impl GameSession for TicTacToeGame {
    type Input = TicTacToeInput;

    fn game_type(&self) -> GameType {
        GameType::TicTacToe
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn handle(&mut self, input: TicTacToeInput) -> Transition {
        match (self.phase, input) {
            (Phase::Menu | Phase::GameOver, TicTacToeInput::Start) => {
                self.board = [None; 9];
                self.last_outcome = None;
                self.score = 0;
                self.phase = Phase::Playing;
                Transition::Updated
            }
            (Phase::Menu | Phase::GameOver, TicTacToeInput::SetDifficulty(difficulty)) => {
                self.difficulty = difficulty;
                Transition::Updated
            }
            (Phase::Playing, TicTacToeInput::Play(cell)) => self.play(cell),
            _ => Transition::Ignored,
        }
    }
}
