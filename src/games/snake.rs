use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

use super::{GameSession, Phase, SessionResult, Transition};
use crate::models::GameType;

pub const GRID_CELLS: i32 = 20;
pub const FOOD_POINTS: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeInput {
    Start,
    Turn(Direction),
    Tick,
    Pause,
    Resume,
}

pub type Cell = (i32, i32);

#[derive(Debug, Clone)]
pub struct SnakeGame {
    rng: StdRng,
    phase: Phase,
    /// Head first.
    body: VecDeque<Cell>,
    heading: Direction,
    pending: Direction,
    food: Cell,
    score: i64,
}

impl SnakeGame {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            rng: StdRng::seed_from_u64(seed),
            phase: Phase::Menu,
            body: VecDeque::new(),
            heading: Direction::Right,
            pending: Direction::Right,
            food: (5, 5),
            score: 0,
        };
        game.reset();
        game
    }

    fn reset(&mut self) {
        self.body = VecDeque::from([(10, 10)]);
        self.heading = Direction::Right;
        self.pending = Direction::Right;
        self.food = (5, 5);
        self.score = 0;
    }

    pub fn body(&self) -> &VecDeque<Cell> {
        &self.body
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    /// Test hook for placing food deterministically.
    pub fn set_food(&mut self, cell: Cell) {
        self.food = cell;
    }

    fn spawn_food(&mut self) {
        // The board can't fill up before the player has long since won.
        for _ in 0..(GRID_CELLS * GRID_CELLS * 4) {
            let cell = (self.rng.gen_range(0..GRID_CELLS), self.rng.gen_range(0..GRID_CELLS));
            if !self.body.contains(&cell) {
                self.food = cell;
                return;
            }
        }
    }

    fn step(&mut self) -> Transition {
        self.heading = self.pending;
        let (dx, dy) = self.heading.delta();
        let (hx, hy) = self.body[0];
        let head = (hx + dx, hy + dy);

        let out_of_bounds = head.0 < 0 || head.0 >= GRID_CELLS || head.1 < 0 || head.1 >= GRID_CELLS;
        let eating = head == self.food;
        // The tail vacates its cell this tick unless the snake grows.
        let body_len = if eating { self.body.len() } else { self.body.len() - 1 };
        let bites_self = self.body.iter().take(body_len).any(|c| *c == head);

        if out_of_bounds || bites_self {
            self.phase = Phase::GameOver;
            return Transition::Finished(SessionResult::new(GameType::Snake, self.score));
        }

        self.body.push_front(head);
        if eating {
            self.score += FOOD_POINTS;
            self.spawn_food();
        } else {
            self.body.pop_back();
        }
        Transition::Updated
    }
}

impl GameSession for SnakeGame {
    type Input = SnakeInput;

    fn game_type(&self) -> GameType {
        GameType::Snake
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn handle(&mut self, input: SnakeInput) -> Transition {
        match (self.phase, input) {
            (Phase::Menu | Phase::GameOver, SnakeInput::Start) => {
                self.reset();
                self.phase = Phase::Playing;
                Transition::Updated
            }
            (Phase::Playing, SnakeInput::Turn(direction)) => {
                if direction == self.heading.opposite() {
                    return Transition::Ignored;
                }
                self.pending = direction;
                Transition::Updated
            }
            (Phase::Playing, SnakeInput::Tick) => self.step(),
            (Phase::Playing, SnakeInput::Pause) => {
                self.phase = Phase::Paused;
                Transition::Updated
            }
            (Phase::Paused, SnakeInput::Resume) => {
                self.phase = Phase::Playing;
                Transition::Updated
            }
            _ => Transition::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(seed: u64) -> SnakeGame {
        let mut game = SnakeGame::new(seed);
        assert_eq!(game.handle(SnakeInput::Start), Transition::Updated);
        game
    }

    #[test]
    fn test_inputs_before_start_are_ignored() {
        let mut game = SnakeGame::new(1);
        assert!(game.handle(SnakeInput::Tick).is_ignored());
        assert_eq!(game.phase(), Phase::Menu);
    }

    #[test]
    fn test_moves_right_until_wall() {
        let mut game = started(1);
        for _ in 0..9 {
            assert_eq!(game.handle(SnakeInput::Tick), Transition::Updated);
        }
        assert_eq!(game.body()[0], (19, 10));
        let result = game.handle(SnakeInput::Tick).result().unwrap();
        assert_eq!(result.score, 0);
        assert_eq!(game.phase(), Phase::GameOver);
    }

    #[test]
    fn test_reverse_turn_is_ignored() {
        let mut game = started(1);
        assert!(game.handle(SnakeInput::Turn(Direction::Left)).is_ignored());
        assert_eq!(game.handle(SnakeInput::Turn(Direction::Up)), Transition::Updated);
        game.handle(SnakeInput::Tick);
        assert_eq!(game.body()[0], (10, 9));
    }

    #[test]
    fn test_eating_grows_and_scores() {
        let mut game = started(3);
        game.set_food((11, 10));
        game.handle(SnakeInput::Tick);
        assert_eq!(game.score(), FOOD_POINTS);
        assert_eq!(game.body().len(), 2);
        assert!(!game.body().contains(&game.food()));
    }

    #[test]
    fn test_pause_stops_ticks() {
        let mut game = started(1);
        game.handle(SnakeInput::Pause);
        assert!(game.handle(SnakeInput::Tick).is_ignored());
        game.handle(SnakeInput::Resume);
        assert_eq!(game.handle(SnakeInput::Tick), Transition::Updated);
    }

    #[test]
    fn test_running_into_own_body_ends_game() {
        let mut game = started(5);
        for food in [(11, 10), (12, 10), (13, 10), (14, 10)] {
            game.set_food(food);
            game.handle(SnakeInput::Tick);
        }
        assert_eq!(game.body().len(), 5);
        game.set_food((0, 0));

        game.handle(SnakeInput::Turn(Direction::Down));
        game.handle(SnakeInput::Tick);
        game.handle(SnakeInput::Turn(Direction::Left));
        game.handle(SnakeInput::Tick);
        game.handle(SnakeInput::Turn(Direction::Up));
        let result = game.handle(SnakeInput::Tick).result().unwrap();
        assert_eq!(result.score, 4 * FOOD_POINTS);
    }
}
