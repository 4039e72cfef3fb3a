use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{GameSession, Phase, SessionResult, Transition};
use crate::models::GameType;

pub const PADS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimonInput {
    Start,
    /// The sequence finished playing back; accept presses.
    ShowDone,
    Press(u8),
}

#[derive(Debug, Clone)]
pub struct SimonGame {
    rng: StdRng,
    phase: Phase,
    sequence: Vec<u8>,
    step: usize,
    score: i64,
}

impl SimonGame {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            phase: Phase::Menu,
            sequence: Vec::new(),
            step: 0,
            score: 0,
        }
    }

    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    fn extend(&mut self) {
        let pad = self.rng.gen_range(0..PADS);
        self.sequence.push(pad);
        self.step = 0;
        self.phase = Phase::Intermission;
    }
}

impl GameSession for SimonGame {
    type Input = SimonInput;

    fn game_type(&self) -> GameType {
        GameType::Simon
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn handle(&mut self, input: SimonInput) -> Transition {
        match (self.phase, input) {
            (Phase::Menu | Phase::GameOver, SimonInput::Start) => {
                self.sequence.clear();
                self.score = 0;
                self.extend();
                Transition::Updated
            }
            (Phase::Intermission, SimonInput::ShowDone) => {
                self.phase = Phase::Playing;
                Transition::Updated
            }
            (Phase::Playing, SimonInput::Press(pad)) => {
                if self.sequence.get(self.step) != Some(&pad) {
                    self.phase = Phase::GameOver;
                    return Transition::Finished(SessionResult::new(GameType::Simon, self.score));
                }
                self.step += 1;
                if self.step == self.sequence.len() {
                    self.extend();
                    self.score = self.sequence.len() as i64;
                }
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
    fn test_rounds_grow_the_sequence() {
        let mut game = SimonGame::new(6);
        game.handle(SimonInput::Start);
        assert_eq!(game.phase(), Phase::Intermission);

        for round in 1..=5 {
            assert!(game.handle(SimonInput::Press(0)).is_ignored());
            game.handle(SimonInput::ShowDone);
            for pad in game.sequence().to_vec() {
                game.handle(SimonInput::Press(pad));
            }
            assert_eq!(game.sequence().len(), round + 1);
            assert_eq!(game.score(), (round + 1) as i64);
        }
    }

    #[test]
    fn test_wrong_press_ends_with_current_score() {
        let mut game = SimonGame::new(2);
        game.handle(SimonInput::Start);
        game.handle(SimonInput::ShowDone);
        let first = game.sequence()[0];
        game.handle(SimonInput::Press(first));
        game.handle(SimonInput::ShowDone);

        let wrong = (game.sequence()[0] + 1) % PADS;
        let result = game.handle(SimonInput::Press(wrong)).result().unwrap();
        assert_eq!(result.score, 2);
        assert_eq!(game.phase(), Phase::GameOver);
    }

    #[test]
    fn test_pads_in_range() {
        let mut game = SimonGame::new(11);
        game.handle(SimonInput::Start);
        for _ in 0..30 {
            game.handle(SimonInput::ShowDone);
            for pad in game.sequence().to_vec() {
                game.handle(SimonInput::Press(pad));
            }
        }
        assert!(game.sequence().iter().all(|&p| p < PADS));
    }
}
