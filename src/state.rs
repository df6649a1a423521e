use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use crate::board::{Board, Position};
use crate::collision::{self, Collision};
use crate::fruit::{FruitSet, FruitSpawner};
use crate::mode::{FruitMode, ModeController, Replenish};
use crate::settings::Settings;
use crate::snake::{Direction, Snake};

/// One value per tick from whoever reads the keyboard.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Input {
    None,
    Left,
    Right,
    Up,
    Down,
    Quit,
    /// Regenerate all fruit. Only honoured in random fruit mode.
    Reshuffle,
}

impl Input {
    pub fn direction(self) -> Option<Direction> {
        match self {
            Input::Left => Some(Direction::Left),
            Input::Right => Some(Direction::Right),
            Input::Up => Some(Direction::Up),
            Input::Down => Some(Direction::Down),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// No direction chosen yet; the snake stands still.
    Idle,
    Running,
    GameOver,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    SelfCollision,
    Quit,
}

/// Read-only view handed to the renderer between ticks.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot<'a> {
    pub board: Board,
    pub head: Position,
    pub body: &'a [Position],
    pub fruits: &'a [Position],
    pub score: u32,
    pub direction: Option<Direction>,
    pub random_mode: bool,
    pub game_over: bool,
    pub status: Status,
    pub end_reason: Option<EndReason>,
}

/// Everything one game session needs. Mutated only through [`GameState::tick`].
pub struct GameState<R = StdRng> {
    board: Board,
    snake: Snake,
    fruits: FruitSet,
    spawner: FruitSpawner,
    mode: ModeController,
    score: u32,
    status: Status,
    end_reason: Option<EndReason>,
    ticks: u64,
    rng: R,
}

impl GameState<StdRng> {
    pub fn seeded(settings: &Settings, seed: u64) -> Result<Self, String> {
        GameState::new(settings, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameState<R> {
    /// Fresh session: head in the middle, no body, no direction, a first batch of fruit.
    pub fn new(settings: &Settings, rng: R) -> Result<Self, String> {
        settings.validate()?;

        let snake = Snake::new(settings.board().center(), settings.max_snake_length);
        let mut state = GameState::assemble(settings, snake, rng);
        state.regenerate();
        if state.fruits.is_empty() {
            state.ensure_fruit();
        }
        Ok(state)
    }

    /// Builds a session from an explicit layout. The state is `Running` if the
    /// snake already has a direction.
    pub fn from_parts(
        settings: &Settings,
        snake: Snake,
        fruits: &[Position],
        rng: R,
    ) -> Result<Self, String> {
        settings.validate()?;

        let board = settings.board();
        if !board.contains(snake.head()) || snake.body().iter().any(|pos| !board.contains(*pos)) {
            return Err("Snake lies outside the board".to_string());
        }

        let mut state = GameState::assemble(settings, snake, rng);
        for &pos in fruits {
            if state.snake.occupies(pos) {
                return Err(format!("Fruit at ({}, {}) overlaps the snake", pos.x, pos.y));
            }
            if !state.fruits.insert(pos) {
                return Err(format!("Fruit at ({}, {}) is off the board or duplicated", pos.x, pos.y));
            }
        }
        Ok(state)
    }

    fn assemble(settings: &Settings, snake: Snake, rng: R) -> Self {
        let board = settings.board();
        let status = if snake.direction().is_some() { Status::Running } else { Status::Idle };

        GameState {
            board,
            snake,
            fruits: FruitSet::new(board),
            spawner: FruitSpawner::new(board, settings.max_fruit_attempts),
            mode: ModeController::new(settings.fruit_mode, settings.max_fruits),
            score: 0,
            status,
            end_reason: None,
            ticks: 0,
            rng,
        }
    }

    /// Advances the session by one tick: input, movement, collision and
    /// consumption, then replenishment.
    #[instrument(level = "trace", skip_all)]
    pub fn tick(&mut self, input: Input) -> Status {
        if self.status == Status::GameOver {
            return self.status;
        }

        match input {
            Input::Quit => {
                self.end(EndReason::Quit);
                return self.status;
            }
            Input::Reshuffle if self.mode.is_random() => {
                self.regenerate();
            }
            _ => {
                if let Some(dir) = input.direction() {
                    if self.snake.apply_direction(dir) && self.status == Status::Idle {
                        self.status = Status::Running;
                    }
                }
            }
        }

        let step = match self.snake.step(&self.board) {
            Some(step) => step,
            None => {
                // Standing still, but the board must not be left bare
                if self.fruits.is_empty() {
                    self.ensure_fruit();
                }
                return self.status;
            }
        };
        self.ticks += 1;
        trace!(x = step.new_head.x, y = step.new_head.y, "snake moved");

        match collision::detect(&self.snake, &self.fruits) {
            Collision::Body => {
                self.end(EndReason::SelfCollision);
                return self.status;
            }
            Collision::Fruit => self.eat(step.new_head),
            Collision::Clear => {}
        }

        let ambient = self.mode.on_tick(&mut self.rng);
        self.replenish(ambient);

        if self.fruits.is_empty() {
            self.ensure_fruit();
        }

        self.status
    }

    /// Clears all fruit and places a fresh batch sized by the current mode.
    pub fn regenerate(&mut self) -> usize {
        let range = self.mode.count_range();
        self.spawner.regenerate(&mut self.fruits, &self.snake, range, &mut self.rng)
    }

    /// Places one fruit unless the board already holds the maximum.
    pub fn try_place_fruit(&mut self) -> Option<Position> {
        if self.fruits.len() >= self.mode.max_fruits() {
            return None;
        }
        self.spawner.try_place_one(&mut self.fruits, &self.snake, &mut self.rng)
    }

    fn eat(&mut self, pos: Position) {
        self.fruits.remove(pos);
        self.score += 1;
        self.snake.grow();
        debug!(score = self.score, length = self.snake.len(), "fruit eaten");

        let work = self.mode.on_eat(&mut self.rng);
        self.replenish(work);
    }

    fn replenish(&mut self, work: Replenish) {
        for _ in 0..work.place {
            self.try_place_fruit();
        }
        if work.regenerate {
            self.regenerate();
        }
        for _ in 0..work.place_after {
            self.try_place_fruit();
        }
    }

    fn ensure_fruit(&mut self) {
        if self.try_place_fruit().is_none() {
            self.spawner.place_anywhere(&mut self.fruits, &self.snake, &mut self.rng);
        }
    }

    fn end(&mut self, reason: EndReason) {
        self.status = Status::GameOver;
        self.end_reason = Some(reason);
        info!(score = self.score, reason = ?reason, "game over");
    }
}

impl<R> GameState<R> {
    pub fn board(&self) -> Board {
        self.board
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn fruits(&self) -> &FruitSet {
        &self.fruits
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn is_game_over(&self) -> bool {
        self.status == Status::GameOver
    }

    pub fn fruit_mode(&self) -> FruitMode {
        self.mode.mode()
    }

    /// Ticks on which the snake actually moved.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            board: self.board,
            head: self.snake.head(),
            body: self.snake.body(),
            fruits: self.fruits.as_slice(),
            score: self.score,
            direction: self.snake.direction(),
            random_mode: self.mode.is_random(),
            game_over: self.is_game_over(),
            status: self.status,
            end_reason: self.end_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: u16, y: u16) -> Position {
        Position::new(x, y)
    }

    fn small(mode: FruitMode) -> Settings {
        Settings { width: 5, height: 5, fruit_mode: mode, ..Settings::default() }
    }

    #[test]
    fn new_session_is_idle_with_fruit() {
        let state = GameState::seeded(&Settings::default(), 1).unwrap();
        assert_eq!(state.status(), Status::Idle);
        assert_eq!(state.snake().head(), p(40, 10));
        assert!(state.snake().is_empty());
        assert!((2..=6).contains(&state.fruits().len()));
        assert_eq!(state.score(), 0);
        assert_eq!(state.fruit_mode(), FruitMode::Normal);
    }

    #[test]
    fn idle_ticks_change_nothing() {
        let mut state = GameState::seeded(&Settings::default(), 2).unwrap();
        let fruits = state.fruits().as_slice().to_vec();

        for _ in 0..10 {
            assert_eq!(state.tick(Input::None), Status::Idle);
        }
        assert_eq!(state.snake().head(), p(40, 10));
        assert_eq!(state.fruits().as_slice(), &fruits[..]);
        assert_eq!(state.ticks(), 0);
    }

    #[test]
    fn first_direction_starts_the_game() {
        let mut state = GameState::seeded(&Settings::default(), 3).unwrap();
        assert_eq!(state.tick(Input::Up), Status::Running);
        assert_eq!(state.snake().head(), p(40, 9));
    }

    #[test]
    fn quit_ends_without_moving() {
        let snake = Snake::from_parts(p(2, 2), &[], Some(Direction::Right), 10).unwrap();
        let mut state =
            GameState::from_parts(&small(FruitMode::Normal), snake, &[p(0, 0)], StdRng::seed_from_u64(4))
                .unwrap();

        assert_eq!(state.tick(Input::Quit), Status::GameOver);
        assert_eq!(state.end_reason(), Some(EndReason::Quit));
        assert_eq!(state.snake().head(), p(2, 2));

        // Terminal: nothing moves any more.
        state.tick(Input::Right);
        assert_eq!(state.snake().head(), p(2, 2));
    }

    #[test]
    fn reshuffle_only_in_random_mode() {
        let layout = [p(0, 0), p(4, 4)];

        let snake = Snake::new(p(2, 2), 10);
        let mut normal =
            GameState::from_parts(&small(FruitMode::Normal), snake.clone(), &layout, StdRng::seed_from_u64(5))
                .unwrap();
        normal.tick(Input::Reshuffle);
        assert_eq!(normal.fruits().as_slice(), &layout);

        let mut random =
            GameState::from_parts(&small(FruitMode::Random), snake, &layout, StdRng::seed_from_u64(5))
                .unwrap();
        random.tick(Input::Reshuffle);
        assert!(!random.fruits().is_empty());
        assert!(random.fruits().len() <= 12);
        assert_eq!(random.status(), Status::Idle);
    }

    #[test]
    fn idle_reshuffle_never_leaves_the_board_bare() {
        // Head plus three free cells; one sample per placement misses often.
        let settings = Settings {
            width: 2,
            height: 2,
            fruit_mode: FruitMode::Random,
            max_fruit_attempts: 1,
            ..Settings::default()
        };

        for seed in 0..200 {
            let snake = Snake::new(p(1, 1), 10);
            let mut state =
                GameState::from_parts(&settings, snake, &[], StdRng::seed_from_u64(seed)).unwrap();

            for _ in 0..5 {
                assert_eq!(state.tick(Input::Reshuffle), Status::Idle);
                assert!(!state.fruits().is_empty(), "seed {} left no fruit", seed);
                assert!(!state.fruits().contains(p(1, 1)));
            }
        }
    }

    #[test]
    fn new_session_always_starts_with_fruit() {
        let settings = Settings {
            width: 2,
            height: 2,
            fruit_mode: FruitMode::Random,
            max_fruit_attempts: 1,
            ..Settings::default()
        };

        for seed in 0..200 {
            let state = GameState::seeded(&settings, seed).unwrap();
            assert!(!state.fruits().is_empty(), "seed {} started bare", seed);
        }
    }

    #[test]
    fn self_collision_ends_the_game() {
        let settings = small(FruitMode::Normal);
        let snake = Snake::from_parts(
            p(1, 2),
            &[p(2, 2), p(2, 1), p(1, 1), p(0, 1)],
            Some(Direction::Left),
            10,
        )
        .unwrap();
        let mut state =
            GameState::from_parts(&settings, snake, &[p(4, 4)], StdRng::seed_from_u64(6)).unwrap();

        assert_eq!(state.tick(Input::Up), Status::GameOver);
        assert_eq!(state.end_reason(), Some(EndReason::SelfCollision));
        assert_eq!(state.score(), 0);
        assert!(state.snapshot().game_over);
    }

    #[test]
    fn capped_growth_still_scores() {
        let settings = small(FruitMode::Normal);
        let snake = Snake::from_parts(p(2, 2), &[p(1, 2)], Some(Direction::Right), 1).unwrap();
        let mut state =
            GameState::from_parts(&settings, snake, &[p(3, 2)], StdRng::seed_from_u64(7)).unwrap();

        state.tick(Input::None);

        assert_eq!(state.score(), 1);
        assert_eq!(state.snake().len(), 1);
        assert_eq!(state.status(), Status::Running);
    }

    #[test]
    fn from_parts_rejects_overlapping_fruit() {
        let settings = small(FruitMode::Normal);
        let snake = Snake::from_parts(p(2, 2), &[p(1, 2)], None, 10).unwrap();
        assert!(GameState::from_parts(&settings, snake.clone(), &[p(1, 2)], StdRng::seed_from_u64(0)).is_err());
        assert!(GameState::from_parts(&settings, snake.clone(), &[p(0, 0), p(0, 0)], StdRng::seed_from_u64(0)).is_err());
        assert!(GameState::from_parts(&settings, snake, &[p(5, 0)], StdRng::seed_from_u64(0)).is_err());
    }
}
