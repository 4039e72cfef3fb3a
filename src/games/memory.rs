use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{GameSession, Phase, SessionResult, Transition};
use crate::models::GameType;

pub const PAIRS: usize = 8;
pub const MATCH_POINTS: i64 = 10;
pub const MISMATCH_PENALTY: i64 = 1;

const SYMBOLS: [char; PAIRS] = ['🍎', '🍌', '🍇', '🍓', '🍒', '🍍', '🥝', '🍉'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub symbol: char,
    pub matched: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryInput {
    Start,
    Flip(usize),
    /// One second elapsed; also turns an unmatched pair back over.
    Tick,
}

#[derive(Debug, Clone)]
pub struct MemoryGame {
    rng: StdRng,
    phase: Phase,
    cards: Vec<Card>,
    face_up: Vec<usize>,
    seconds: u32,
    moves: u32,
    score: i64,
}

impl MemoryGame {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            phase: Phase::Menu,
            cards: Vec::new(),
            face_up: Vec::new(),
            seconds: 0,
            moves: 0,
            score: 0,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn face_up(&self) -> &[usize] {
        &self.face_up
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    fn deal(&mut self) {
        let mut cards: Vec<Card> = SYMBOLS
            .iter()
            .chain(SYMBOLS.iter())
            .map(|&symbol| Card { symbol, matched: false })
            .collect();
        cards.shuffle(&mut self.rng);
        self.cards = cards;
        self.face_up.clear();
        self.seconds = 0;
        self.moves = 0;
        self.score = 0;
    }

    fn flip(&mut self, index: usize) -> Transition {
        let card = match self.cards.get(index) {
            Some(card) => *card,
            None => return Transition::Ignored,
        };
        if card.matched || self.face_up.len() == 2 || self.face_up.contains(&index) {
            return Transition::Ignored;
        }

        self.face_up.push(index);
        if self.face_up.len() < 2 {
            return Transition::Updated;
        }

        self.moves += 1;
        let (a, b) = (self.face_up[0], self.face_up[1]);
        if self.cards[a].symbol == self.cards[b].symbol {
            self.cards[a].matched = true;
            self.cards[b].matched = true;
            self.face_up.clear();
            self.score += MATCH_POINTS;

            if self.cards.iter().all(|c| c.matched) {
                self.phase = Phase::GameOver;
                let final_score = (self.score - i64::from(self.seconds / 10)).max(0);
                self.score = final_score;
                return Transition::Finished(SessionResult::new(GameType::Memory, final_score));
            }
        } else {
            // Pair stays face up until the next tick.
            self.score = (self.score - MISMATCH_PENALTY).max(0);
        }
        Transition::Updated
    }
}

impl GameSession for MemoryGame {
    type Input = MemoryInput;

    fn game_type(&self) -> GameType {
        GameType::Memory
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn handle(&mut self, input: MemoryInput) -> Transition {
        match (self.phase, input) {
            (Phase::Menu | Phase::GameOver, MemoryInput::Start) => {
                self.deal();
                self.phase = Phase::Playing;
                Transition::Updated
            }
            (Phase::Playing, MemoryInput::Flip(index)) => self.flip(index),
            (Phase::Playing, MemoryInput::Tick) => {
                self.seconds += 1;
                if self.face_up.len() == 2 {
                    self.face_up.clear();
                }
                Transition::Updated
            }
            _ => Transition::Ignored,
        }
    }
}
