use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{GameSession, Phase, SessionResult, Transition};
use crate::models::GameType;

/// Row-major tiles, 0 is the blank.
pub type Tiles = [u8; 16];

pub const SOLVED: Tiles = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 0];

/// Standard 4x4 parity rule on inversions and the blank's row from the bottom.
pub fn is_solvable(tiles: &Tiles) -> bool {
    let mut inversions = 0;
    for i in 0..16 {
        for j in (i + 1)..16 {
            if tiles[i] != 0 && tiles[j] != 0 && tiles[i] > tiles[j] {
                inversions += 1;
            }
        }
    }
    let blank = tiles.iter().position(|&t| t == 0).unwrap_or(15);
    let row_from_bottom = 4 - blank / 4;
    if row_from_bottom % 2 == 0 {
        inversions % 2 == 1
    } else {
        inversions % 2 == 0
    }
}

fn adjacent(a: usize, b: usize) -> bool {
    let (r1, c1) = (a / 4, a % 4);
    let (r2, c2) = (b / 4, b % 4);
    (r1 == r2 && c1.abs_diff(c2) == 1) || (c1 == c2 && r1.abs_diff(r2) == 1)
}

pub fn solved_score(seconds: u32, moves: u32) -> i64 {
    let time_bonus = (300 - i64::from(seconds)).max(0);
    (400 + time_bonus - 5 * i64::from(moves)).max(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Puzzle15Input {
    Start,
    /// Slide the tile at this index into the blank.
    Slide(usize),
    Tick,
}

#[derive(Debug, Clone)]
pub struct Puzzle15Game {
    rng: StdRng,
    phase: Phase,
    tiles: Tiles,
    moves: u32,
    seconds: u32,
    score: i64,
}

impl Puzzle15Game {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            phase: Phase::Menu,
            tiles: SOLVED,
            moves: 0,
            seconds: 0,
            score: 0,
        }
    }

    /// Start a round from a given arrangement instead of a random one.
    pub fn from_tiles(seed: u64, tiles: Tiles) -> Self {
        let mut game = Self::new(seed);
        game.tiles = tiles;
        game.phase = Phase::Playing;
        game
    }

    pub fn tiles(&self) -> &Tiles {
        &self.tiles
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    fn shuffle(&mut self) {
        loop {
            let mut tiles = SOLVED;
            tiles.shuffle(&mut self.rng);
            if !is_solvable(&tiles) {
                // Swapping two numbered tiles flips the inversion parity.
                let numbered: Vec<usize> = (0..16).filter(|&i| tiles[i] != 0).take(2).collect();
                tiles.swap(numbered[0], numbered[1]);
            }
            if tiles != SOLVED {
                self.tiles = tiles;
                return;
            }
        }
    }

    fn slide(&mut self, index: usize) -> Transition {
        let blank = match self.tiles.iter().position(|&t| t == 0) {
            Some(blank) => blank,
            None => return Transition::Ignored,
        };
        if index >= 16 || !adjacent(index, blank) {
            return Transition::Ignored;
        }

        self.tiles.swap(index, blank);
        self.moves += 1;

        if self.tiles == SOLVED {
            self.score = solved_score(self.seconds, self.moves);
            self.phase = Phase::GameOver;
            return Transition::Finished(SessionResult::new(GameType::Puzzle15, self.score));
        }
        Transition::Updated
    }
}

impl GameSession for Puzzle15Game {
    type Input = Puzzle15Input;

    fn game_type(&self) -> GameType {
        GameType::Puzzle15
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn handle(&mut self, input: Puzzle15Input) -> Transition {
        match (self.phase, input) {
            (Phase::Menu | Phase::GameOver, Puzzle15Input::Start) => {
                self.shuffle();
                self.moves = 0;
                self.seconds = 0;
                self.score = 0;
                self.phase = Phase::Playing;
                Transition::Updated
            }
            (Phase::Playing, Puzzle15Input::Slide(index)) => self.slide(index),
            (Phase::Playing, Puzzle15Input::Tick) => {
                self.seconds += 1;
                Transition::Updated
            }
            _ => Transition::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solvability_parity() {
        assert!(is_solvable(&SOLVED));
        let mut swapped = SOLVED;
        swapped.swap(13, 14);
        assert!(!is_solvable(&swapped));
    }

    #[test]
    fn test_shuffles_are_solvable() {
        for seed in 0..50 {
            let mut game = Puzzle15Game::new(seed);
            game.handle(Puzzle15Input::Start);
            assert!(is_solvable(game.tiles()));
            assert_ne!(game.tiles(), &SOLVED);
        }
    }

    #[test]
    fn test_only_adjacent_tiles_slide() {
        let mut game = Puzzle15Game::from_tiles(0, SOLVED);
        assert!(game.handle(Puzzle15Input::Slide(0)).is_ignored());
        assert!(game.handle(Puzzle15Input::Slide(16)).is_ignored());
        assert_eq!(game.handle(Puzzle15Input::Slide(11)), Transition::Updated);
        assert_eq!(game.tiles()[15], 12);
    }

    #[test]
    fn test_solving_scores_time_and_moves() {
        let mut tiles = SOLVED;
        tiles.swap(14, 15);
        let mut game = Puzzle15Game::from_tiles(0, tiles);
        for _ in 0..100 {
            game.handle(Puzzle15Input::Tick);
        }
        let result = game.handle(Puzzle15Input::Slide(15)).result().unwrap();
        assert_eq!(result.score, 400 + 200 - 5);
        assert_eq!(game.phase(), Phase::GameOver);
    }

    #[test]
    fn test_score_floor() {
        assert_eq!(solved_score(1_000, 200), 0);
        assert_eq!(solved_score(0, 0), 700);
    }
}
