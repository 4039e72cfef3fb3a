use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{GameSession, Phase, SessionResult, Transition};
use crate::models::{Difficulty, GameType};

pub const QUESTION_SECONDS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub prompt: &'static str,
    pub options: [&'static str; 4],
    pub correct: usize,
    pub difficulty: Difficulty,
}

impl Question {
    /// Base points by difficulty plus one point per five seconds left.
    pub fn points(&self, seconds_left: u32) -> i64 {
        let base = match self.difficulty {
            Difficulty::Easy => 10,
            Difficulty::Medium => 15,
            Difficulty::Hard => 20,
        };
        base + i64::from(seconds_left / 5)
    }
}

pub const QUESTION_BANK: [Question; 10] = [
    Question {
        prompt: "What is the consensus mechanism used by Algorand?",
        options: ["Proof of Work", "Proof of Stake", "Pure Proof of Stake", "Delegated Proof of Stake"],
        correct: 2,
        difficulty: Difficulty::Medium,
    },
    Question {
        prompt: "What is the native token of the Algorand blockchain?",
        options: ["ALG", "ALGO", "ALD", "AGO"],
        correct: 1,
        difficulty: Difficulty::Easy,
    },
    Question {
        prompt: "What does ASA stand for in the Algorand ecosystem?",
        options: ["Algorand Smart Asset", "Algorand Staking Asset", "Algorand Security Asset", "Algorand System Asset"],
        correct: 0,
        difficulty: Difficulty::Medium,
    },
    Question {
        prompt: "What is the approximate block time for Algorand?",
        options: ["1 second", "4.5 seconds", "10 seconds", "15 seconds"],
        correct: 1,
        difficulty: Difficulty::Medium,
    },
    Question {
        prompt: "Who founded Algorand?",
        options: ["Vitalik Buterin", "Silvio Micali", "Charles Hoskinson", "Gavin Wood"],
        correct: 1,
        difficulty: Difficulty::Hard,
    },
    Question {
        prompt: "What is the maximum supply of ALGO tokens?",
        options: ["1 billion", "10 billion", "21 million", "No maximum supply"],
        correct: 1,
        difficulty: Difficulty::Hard,
    },
    Question {
        prompt: "What is a smart contract called on Algorand?",
        options: ["dApp", "Smart Contract", "Algorand Smart Contract (ASC1)", "Teal Contract"],
        correct: 2,
        difficulty: Difficulty::Medium,
    },
    Question {
        prompt: "What programming language is primarily used for Algorand smart contracts?",
        options: ["Solidity", "Rust", "TEAL", "JavaScript"],
        correct: 2,
        difficulty: Difficulty::Medium,
    },
    Question {
        prompt: "What is the finality time for transactions on Algorand?",
        options: ["Instant", "~4.5 seconds", "1 minute", "10 minutes"],
        correct: 1,
        difficulty: Difficulty::Easy,
    },
    Question {
        prompt: "What is Algorand's approach to scalability called?",
        options: ["Sharding", "Layer 2", "Co-Chains", "State Channels"],
        correct: 2,
        difficulty: Difficulty::Hard,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriviaInput {
    Start,
    Answer(usize),
    /// One second elapsed.
    Tick,
    Next,
}

#[derive(Debug, Clone)]
pub struct TriviaGame {
    rng: StdRng,
    phase: Phase,
    order: Vec<usize>,
    current: usize,
    seconds_left: u32,
    correct_answers: u32,
    last_correct: Option<bool>,
    score: i64,
}

impl TriviaGame {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            phase: Phase::Menu,
            order: (0..QUESTION_BANK.len()).collect(),
            current: 0,
            seconds_left: QUESTION_SECONDS,
            correct_answers: 0,
            last_correct: None,
            score: 0,
        }
    }

    pub fn current_question(&self) -> Option<&'static Question> {
        self.order.get(self.current).map(|&i| &QUESTION_BANK[i])
    }

    pub fn seconds_left(&self) -> u32 {
        self.seconds_left
    }

    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    /// Whether the last resolved question was answered correctly.
    pub fn last_correct(&self) -> Option<bool> {
        self.last_correct
    }

    fn start(&mut self) {
        self.order.shuffle(&mut self.rng);
        self.current = 0;
        self.seconds_left = QUESTION_SECONDS;
        self.correct_answers = 0;
        self.last_correct = None;
        self.score = 0;
        self.phase = Phase::Playing;
    }

    fn resolve(&mut self, answer: Option<usize>) {
        if let Some(question) = self.current_question() {
            let correct = answer == Some(question.correct);
            if correct {
                self.correct_answers += 1;
                self.score += question.points(self.seconds_left);
            }
            self.last_correct = Some(correct);
        }
        self.phase = Phase::Intermission;
    }
}

impl GameSession for TriviaGame {
    type Input = TriviaInput;

    fn game_type(&self) -> GameType {
        GameType::Trivia
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn handle(&mut self, input: TriviaInput) -> Transition {
        match (self.phase, input) {
            (Phase::Menu | Phase::GameOver, TriviaInput::Start) => {
                self.start();
                Transition::Updated
            }
            (Phase::Playing, TriviaInput::Answer(choice)) => {
                if choice >= 4 {
                    return Transition::Ignored;
                }
                self.resolve(Some(choice));
                Transition::Updated
            }
            (Phase::Playing, TriviaInput::Tick) => {
                self.seconds_left = self.seconds_left.saturating_sub(1);
                if self.seconds_left == 0 {
                    self.resolve(None);
                }
                Transition::Updated
            }
            (Phase::Intermission, TriviaInput::Next) => {
                if self.current + 1 < self.order.len() {
                    self.current += 1;
                    self.seconds_left = QUESTION_SECONDS;
                    self.last_correct = None;
                    self.phase = Phase::Playing;
                    Transition::Updated
                } else {
                    self.phase = Phase::GameOver;
                    Transition::Finished(SessionResult::new(GameType::Trivia, self.score))
                }
            }
            _ => Transition::Ignored,
        }
    }
}
