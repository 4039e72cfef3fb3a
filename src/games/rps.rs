use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::{GameSession, Phase, SessionResult, Transition};
use crate::models::{Difficulty, GameType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Rock,
    Paper,
    Scissors,
}

impl Choice {
    pub const ALL: [Choice; 3] = [Choice::Rock, Choice::Paper, Choice::Scissors];

    pub fn beats(self, other: Choice) -> bool {
        matches!(
            (self, other),
            (Choice::Rock, Choice::Scissors) | (Choice::Paper, Choice::Rock) | (Choice::Scissors, Choice::Paper)
        )
    }

    /// The choice that beats `self`.
    pub fn counter(self) -> Choice {
        match self {
            Choice::Rock => Choice::Paper,
            Choice::Paper => Choice::Scissors,
            Choice::Scissors => Choice::Rock,
        }
    }

    /// The choice that loses to `self`.
    pub fn victim(self) -> Choice {
        match self {
            Choice::Rock => Choice::Scissors,
            Choice::Paper => Choice::Rock,
            Choice::Scissors => Choice::Paper,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundResult {
    Win,
    Lose,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpsInput {
    Start,
    SetDifficulty(Difficulty),
    Throw(Choice),
    Finish,
}

#[derive(Debug, Clone)]
pub struct RpsGame {
    rng: StdRng,
    phase: Phase,
    difficulty: Difficulty,
    last_round: Option<(Choice, Choice, RoundResult)>,
    rounds: u32,
    streak: u32,
    score: i64,
}

impl RpsGame {
    pub fn new(seed: u64, difficulty: Difficulty) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            phase: Phase::Menu,
            difficulty,
            last_round: None,
            rounds: 0,
            streak: 0,
            score: 0,
        }
    }

    /// (player, ai, result) of the most recent round.
    pub fn last_round(&self) -> Option<(Choice, Choice, RoundResult)> {
        self.last_round
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    fn ai_pick(&mut self, player: Choice) -> Choice {
        let roll: f64 = self.rng.gen();
        match self.difficulty {
            Difficulty::Easy if roll < 0.1 => return player.victim(),
            Difficulty::Hard if roll < 0.35 => return player.counter(),
            _ => {}
        }
        *Choice::ALL.choose(&mut self.rng).unwrap_or(&Choice::Rock)
    }

    fn win_points(&self) -> i64 {
        match self.difficulty {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }
}

impl GameSession for RpsGame {
    type Input = RpsInput;

    fn game_type(&self) -> GameType {
        GameType::Rps
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn handle(&mut self, input: RpsInput) -> Transition {
        match (self.phase, input) {
            (Phase::Menu | Phase::GameOver, RpsInput::Start) => {
                self.last_round = None;
                self.rounds = 0;
                self.streak = 0;
                self.score = 0;
                self.phase = Phase::Playing;
                Transition::Updated
            }
            (Phase::Menu | Phase::GameOver, RpsInput::SetDifficulty(difficulty)) => {
                self.difficulty = difficulty;
                Transition::Updated
            }
            (Phase::Playing, RpsInput::Throw(player)) => {
                let ai = self.ai_pick(player);
                let result = if player == ai {
                    RoundResult::Draw
                } else if player.beats(ai) {
                    RoundResult::Win
                } else {
                    RoundResult::Lose
                };

                match result {
                    RoundResult::Win => {
                        self.score += self.win_points();
                        self.streak += 1;
                    }
                    RoundResult::Lose => self.streak = 0,
                    RoundResult::Draw => {}
                }
                self.rounds += 1;
                self.last_round = Some((player, ai, result));
                Transition::Updated
            }
            (Phase::Playing, RpsInput::Finish) => {
                self.phase = Phase::GameOver;
                Transition::Finished(
                    SessionResult::new(GameType::Rps, self.score).with_difficulty(self.difficulty),
                )
            }
            _ => Transition::Ignored,
        }
    }
}
