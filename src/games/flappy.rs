use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{GameSession, Phase, SessionResult, Transition};
use crate::models::GameType;

pub const WIDTH: f64 = 400.0;
pub const HEIGHT: f64 = 600.0;
pub const GRAVITY: f64 = 0.5;
pub const FLAP_VELOCITY: f64 = -7.5;
pub const PIPE_SPEED: f64 = 2.5;
pub const PIPE_GAP: f64 = 140.0;
pub const PIPE_WIDTH: f64 = 60.0;
pub const PIPE_SPACING: f64 = 200.0;
pub const BIRD_X: f64 = WIDTH / 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pipe {
    pub x: f64,
    /// Vertical centre of the gap.
    pub gap_y: f64,
    pub passed: bool,
}

impl Pipe {
    fn hits(&self, bird_y: f64) -> bool {
        let inside_x = BIRD_X > self.x && BIRD_X < self.x + PIPE_WIDTH;
        let outside_gap = bird_y < self.gap_y - PIPE_GAP / 2.0 || bird_y > self.gap_y + PIPE_GAP / 2.0;
        inside_x && outside_gap
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlappyInput {
    Start,
    Flap,
    /// One animation frame.
    Tick,
}

#[derive(Debug, Clone)]
pub struct FlappyGame {
    rng: StdRng,
    phase: Phase,
    bird_y: f64,
    velocity: f64,
    pipes: Vec<Pipe>,
    score: i64,
}

impl FlappyGame {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            phase: Phase::Menu,
            bird_y: HEIGHT / 2.0,
            velocity: 0.0,
            pipes: Vec::new(),
            score: 0,
        }
    }

    pub fn bird_y(&self) -> f64 {
        self.bird_y
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    fn random_gap(&mut self) -> f64 {
        200.0 + self.rng.gen_range(-75.0..75.0)
    }

    fn reset(&mut self) {
        self.bird_y = HEIGHT / 2.0;
        self.velocity = 0.0;
        self.score = 0;
        self.pipes.clear();
        for i in 1..=3 {
            let gap_y = self.random_gap();
            self.pipes.push(Pipe {
                x: WIDTH + PIPE_SPACING * f64::from(i),
                gap_y,
                passed: false,
            });
        }
    }

    fn step(&mut self) -> Transition {
        self.velocity += GRAVITY;
        self.bird_y += self.velocity;

        for pipe in &mut self.pipes {
            pipe.x -= PIPE_SPEED;
        }

        if self.pipes.first().map_or(false, |p| p.x + PIPE_WIDTH < 0.0) {
            self.pipes.remove(0);
            let x = self.pipes.last().map_or(WIDTH, |p| p.x) + PIPE_SPACING;
            let gap_y = self.random_gap();
            self.pipes.push(Pipe { x, gap_y, passed: false });
        }

        for pipe in &mut self.pipes {
            if !pipe.passed && pipe.x + PIPE_WIDTH < BIRD_X {
                pipe.passed = true;
                self.score += 1;
            }
        }

        let bird_y = self.bird_y;
        let crashed = bird_y < 0.0 || bird_y > HEIGHT || self.pipes.iter().any(|p| p.hits(bird_y));
        if crashed {
            self.phase = Phase::GameOver;
            return Transition::Finished(SessionResult::new(GameType::Flappy, self.score));
        }
        Transition::Updated
    }
}

impl GameSession for FlappyGame {
    type Input = FlappyInput;

    fn game_type(&self) -> GameType {
        GameType::Flappy
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn handle(&mut self, input: FlappyInput) -> Transition {
        match (self.phase, input) {
            (Phase::Menu | Phase::GameOver, FlappyInput::Start) => {
                self.reset();
                self.phase = Phase::Playing;
                Transition::Updated
            }
            (Phase::Playing, FlappyInput::Flap) => {
                self.velocity = FLAP_VELOCITY;
                Transition::Updated
            }
            (Phase::Playing, FlappyInput::Tick) => self.step(),
            _ => Transition::Ignored,
        }
    }
}
