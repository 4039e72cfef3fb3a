use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::{GameSession, Phase, SessionResult, Transition};
use crate::models::GameType;

pub type Grid = [[u32; 4]; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    Up,
    Down,
    Left,
    Right,
}

impl SlideDirection {
    pub const ALL: [SlideDirection; 4] = [
        SlideDirection::Up,
        SlideDirection::Down,
        SlideDirection::Left,
        SlideDirection::Right,
    ];
}

/// Slide one line toward index 0, merging each pair at most once.
fn compress(line: [u32; 4]) -> [u32; 4] {
    let tiles: Vec<u32> = line.iter().copied().filter(|&v| v != 0).collect();
    let mut out = [0; 4];
    let mut write = 0;
    let mut i = 0;
    while i < tiles.len() {
        if i + 1 < tiles.len() && tiles[i] == tiles[i + 1] {
            out[write] = tiles[i] * 2;
            i += 2;
        } else {
            out[write] = tiles[i];
            i += 1;
        }
        write += 1;
    }
    out
}

pub fn slide(grid: &Grid, direction: SlideDirection) -> Grid {
    let mut out = [[0; 4]; 4];
    for k in 0..4 {
        // Cells of row/column k ordered from the edge the tiles move toward.
        let cells: [(usize, usize); 4] = match direction {
            SlideDirection::Left => [(k, 0), (k, 1), (k, 2), (k, 3)],
            SlideDirection::Right => [(k, 3), (k, 2), (k, 1), (k, 0)],
            SlideDirection::Up => [(0, k), (1, k), (2, k), (3, k)],
            SlideDirection::Down => [(3, k), (2, k), (1, k), (0, k)],
        };
        let line = cells.map(|(r, c)| grid[r][c]);
        for ((r, c), value) in cells.into_iter().zip(compress(line)) {
            out[r][c] = value;
        }
    }
    out
}

pub fn can_move(grid: &Grid) -> bool {
    SlideDirection::ALL.iter().any(|&d| slide(grid, d) != *grid)
}

pub fn max_tile(grid: &Grid) -> u32 {
    grid.iter().flatten().copied().max().unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Game2048Input {
    Start,
    Slide(SlideDirection),
    Finish,
}

#[derive(Debug, Clone)]
pub struct Game2048 {
    rng: StdRng,
    phase: Phase,
    grid: Grid,
}

impl Game2048 {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            phase: Phase::Menu,
            grid: [[0; 4]; 4],
        }
    }

    pub fn from_grid(seed: u64, grid: Grid) -> Self {
        let mut game = Self::new(seed);
        game.grid = grid;
        game.phase = Phase::Playing;
        game
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    fn spawn(&mut self) {
        let empty: Vec<(usize, usize)> = (0..4)
            .flat_map(|r| (0..4).map(move |c| (r, c)))
            .filter(|&(r, c)| self.grid[r][c] == 0)
            .collect();
        if let Some(&(r, c)) = empty.choose(&mut self.rng) {
            self.grid[r][c] = if self.rng.gen_bool(0.9) { 2 } else { 4 };
        }
    }

    fn finish(&mut self) -> Transition {
        self.phase = Phase::GameOver;
        Transition::Finished(SessionResult::new(GameType::Game2048, i64::from(max_tile(&self.grid))))
    }
}

impl GameSession for Game2048 {
    type Input = Game2048Input;

    fn game_type(&self) -> GameType {
        GameType::Game2048
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> i64 {
        i64::from(max_tile(&self.grid))
    }

    fn handle(&mut self, input: Game2048Input) -> Transition {
        match (self.phase, input) {
            (Phase::Menu | Phase::GameOver, Game2048Input::Start) => {
                self.grid = [[0; 4]; 4];
                self.spawn();
                self.spawn();
                self.phase = Phase::Playing;
                Transition::Updated
            }
            (Phase::Playing, Game2048Input::Slide(direction)) => {
                let next = slide(&self.grid, direction);
                if next == self.grid {
                    return Transition::Ignored;
                }
                self.grid = next;
                self.spawn();
                if can_move(&self.grid) {
                    Transition::Updated
                } else {
                    self.finish()
                }
            }
            (Phase::Playing, Game2048Input::Finish) => self.finish(),
            _ => Transition::Ignored,
        }
    }
}
