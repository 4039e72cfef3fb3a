use super::{GameSession, Phase, SessionResult, Transition};
use crate::models::GameType;

/// 0 marks an empty cell.
pub const PUZZLE: [u8; 81] = [
    0, 0, 0, 2, 6, 0, 7, 0, 1,
    6, 8, 0, 0, 7, 0, 0, 9, 0,
    1, 9, 0, 0, 0, 4, 5, 0, 0,
    8, 2, 0, 1, 0, 0, 0, 4, 0,
    0, 0, 4, 6, 0, 2, 9, 0, 0,
    0, 5, 0, 0, 0, 3, 0, 2, 8,
    0, 0, 9, 3, 0, 0, 0, 7, 4,
    0, 4, 0, 0, 5, 0, 0, 3, 6,
    7, 0, 3, 0, 1, 8, 0, 0, 0,
];

pub const BASE_SCORE: i64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SudokuCell {
    pub value: u8,
    pub fixed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SudokuInput {
    Start,
    Place { row: usize, col: usize, value: u8 },
    Clear { row: usize, col: usize },
    Tick,
}

#[derive(Debug, Clone)]
pub struct SudokuGame {
    phase: Phase,
    grid: [SudokuCell; 81],
    seconds: u32,
    score: i64,
}

impl Default for SudokuGame {
    fn default() -> Self {
        Self::new()
    }
}

impl SudokuGame {
    pub fn new() -> Self {
        Self {
            phase: Phase::Menu,
            grid: Self::load(&PUZZLE),
            seconds: 0,
            score: 0,
        }
    }

    fn load(puzzle: &[u8; 81]) -> [SudokuCell; 81] {
        let mut grid = [SudokuCell::default(); 81];
        for (cell, &value) in grid.iter_mut().zip(puzzle.iter()) {
            *cell = SudokuCell { value, fixed: value != 0 };
        }
        grid
    }

    pub fn value(&self, row: usize, col: usize) -> u8 {
        self.grid[row * 9 + col].value
    }

    /// Whether `value` fits at (row, col) given every other cell.
    pub fn fits(&self, row: usize, col: usize, value: u8) -> bool {
        for i in 0..9 {
            if i != col && self.value(row, i) == value {
                return false;
            }
            if i != row && self.value(i, col) == value {
                return false;
            }
        }

        let (box_row, box_col) = (row / 3 * 3, col / 3 * 3);
        for r in box_row..box_row + 3 {
            for c in box_col..box_col + 3 {
                if (r, c) != (row, col) && self.value(r, c) == value {
                    return false;
                }
            }
        }
        true
    }

    fn editable(&self, row: usize, col: usize) -> bool {
        row < 9 && col < 9 && !self.grid[row * 9 + col].fixed
    }

    fn place(&mut self, row: usize, col: usize, value: u8) -> Transition {
        if !self.editable(row, col) || !(1..=9).contains(&value) || !self.fits(row, col, value) {
            return Transition::Ignored;
        }
        self.grid[row * 9 + col].value = value;

        if self.grid.iter().all(|cell| cell.value != 0) {
            self.score = (BASE_SCORE - i64::from(self.seconds)).max(0);
            self.phase = Phase::GameOver;
            return Transition::Finished(SessionResult::new(GameType::Sudoku, self.score));
        }
        Transition::Updated
    }
}

impl GameSession for SudokuGame {
    type Input = SudokuInput;

    fn game_type(&self) -> GameType {
        GameType::Sudoku
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn handle(&mut self, input: SudokuInput) -> Transition {
        match (self.phase, input) {
            (Phase::Menu | Phase::GameOver, SudokuInput::Start) => {
                self.grid = Self::load(&PUZZLE);
                self.seconds = 0;
                self.score = 0;
                self.phase = Phase::Playing;
                Transition::Updated
            }
            (Phase::Playing, SudokuInput::Place { row, col, value }) => self.place(row, col, value),
            (Phase::Playing, SudokuInput::Clear { row, col }) => {
                if !self.editable(row, col) {
                    return Transition::Ignored;
                }
                self.grid[row * 9 + col].value = 0;
                Transition::Updated
            }
            (Phase::Playing, SudokuInput::Tick) => {
                self.seconds += 1;
                Transition::Updated
            }
            _ => Transition::Ignored,
        }
    }
}
