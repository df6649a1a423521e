use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::board::{Board, Position};
use Direction::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        matches!(
            (self, other),
            (Up, Down) | (Down, Up) | (Right, Left) | (Left, Right)
        )
    }
}

/// What a single `Snake::step` did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub old_head: Position,
    pub new_head: Position,
    /// The cell the tail left behind this step (the old head for a bodyless snake).
    pub vacated: Position,
}

/// Head plus trailing segments, head-adjacent first.
///
/// Body storage is allocated once at `capacity` and never grows past it, so
/// play never reallocates.
#[derive(Clone, Debug)]
pub struct Snake {
    head: Position,
    body: Vec<Position>,
    capacity: usize,
    direction: Option<Direction>,
    vacated: Option<Position>,
}

impl Snake {
    pub fn new(head: Position, capacity: usize) -> Self {
        Snake {
            head,
            body: Vec::with_capacity(capacity),
            capacity,
            direction: None,
            vacated: None,
        }
    }

    pub fn from_parts(
        head: Position,
        body: &[Position],
        direction: Option<Direction>,
        capacity: usize,
    ) -> Result<Self, String> {
        if body.len() > capacity {
            return Err(format!(
                "Body has {} segments but capacity is {}",
                body.len(),
                capacity
            ));
        }
        if body.contains(&head) {
            return Err(format!("Head ({}, {}) overlaps the body", head.x, head.y));
        }

        let mut snake = Snake::new(head, capacity);
        snake.body.extend_from_slice(body);
        snake.direction = direction;
        Ok(snake)
    }

    pub fn head(&self) -> Position {
        self.head
    }

    pub fn body(&self) -> &[Position] {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn occupies(&self, pos: Position) -> bool {
        self.head == pos || self.body.contains(&pos)
    }

    /// Returns `false` when `requested` would reverse straight into the neck.
    pub fn apply_direction(&mut self, requested: Direction) -> bool {
        match self.direction {
            Some(current) if requested.is_opposite(current) => false,
            _ => {
                self.direction = Some(requested);
                true
            }
        }
    }

    /// Shifts every segment into the place of the one ahead of it, then moves
    /// the head one cell. Does nothing until a direction has been set.
    pub fn step(&mut self, board: &Board) -> Option<Step> {
        let dir = self.direction?;
        let old_head = self.head;

        let vacated = match self.body.last() {
            Some(tail) => *tail,
            None => old_head,
        };

        let len = self.body.len();
        if len > 0 {
            self.body.copy_within(0..len - 1, 1);
            self.body[0] = old_head;
        }

        self.head = board.neighbor(old_head, dir);
        self.vacated = Some(vacated);

        Some(Step { old_head, new_head: self.head, vacated })
    }

    /// Keeps the cell vacated by the last step as a new tail segment.
    ///
    /// Returns `false` if the body is already at capacity or no step has
    /// vacated a cell since the last growth.
    pub fn grow(&mut self) -> bool {
        if self.body.len() >= self.capacity {
            warn!(capacity = self.capacity, "snake at maximum length, growth capped");
            return false;
        }

        match self.vacated.take() {
            Some(tail) => {
                self.body.push(tail);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: u16, y: u16) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn reversal_is_ignored() {
        let mut snake = Snake::new(p(2, 2), 10);
        assert!(snake.apply_direction(Right));
        assert!(!snake.apply_direction(Left));
        assert_eq!(snake.direction(), Some(Right));
        assert!(snake.apply_direction(Up));
        assert_eq!(snake.direction(), Some(Up));
    }

    #[test]
    fn any_first_direction_is_accepted() {
        let mut snake = Snake::new(p(2, 2), 10);
        assert!(snake.apply_direction(Left));
        assert_eq!(snake.direction(), Some(Left));
    }

    #[test]
    fn no_movement_without_direction() {
        let board = Board::new(5, 5);
        let mut snake = Snake::new(p(2, 2), 10);
        assert_eq!(snake.step(&board), None);
        assert_eq!(snake.head(), p(2, 2));
    }

    #[test]
    fn body_follows_like_a_shift_register() {
        let board = Board::new(10, 10);
        let mut snake = Snake::from_parts(p(3, 3), &[p(2, 3), p(1, 3), p(1, 4)], Some(Right), 10)
            .unwrap();

        let step = snake.step(&board).unwrap();

        assert_eq!(step.old_head, p(3, 3));
        assert_eq!(step.new_head, p(4, 3));
        assert_eq!(step.vacated, p(1, 4));
        assert_eq!(snake.body(), &[p(3, 3), p(2, 3), p(1, 3)]);
    }

    #[test]
    fn growth_keeps_the_vacated_tail() {
        let board = Board::new(10, 10);
        let mut snake = Snake::from_parts(p(3, 3), &[p(2, 3)], Some(Right), 10).unwrap();

        snake.step(&board);
        assert!(snake.grow());

        assert_eq!(snake.body(), &[p(3, 3), p(2, 3)]);
        // Only one segment per vacated cell.
        assert!(!snake.grow());
        assert_eq!(snake.len(), 2);
    }

    #[test]
    fn bodyless_snake_grows_into_its_old_head() {
        let board = Board::new(5, 5);
        let mut snake = Snake::from_parts(p(2, 2), &[], Some(Down), 10).unwrap();

        snake.step(&board);
        assert!(snake.grow());

        assert_eq!(snake.head(), p(2, 3));
        assert_eq!(snake.body(), &[p(2, 2)]);
    }

    #[test]
    fn growth_is_capped_at_capacity() {
        let board = Board::new(10, 10);
        let mut snake = Snake::from_parts(p(3, 3), &[p(2, 3), p(1, 3)], Some(Right), 2).unwrap();
        assert_eq!(snake.capacity(), 2);

        snake.step(&board);
        assert!(!snake.grow());
        assert_eq!(snake.len(), 2);
        assert_eq!(snake.body(), &[p(3, 3), p(2, 3)]);
    }

    #[test]
    fn from_parts_rejects_bad_layouts() {
        assert!(Snake::from_parts(p(1, 1), &[p(1, 1)], None, 5).is_err());
        assert!(Snake::from_parts(p(1, 1), &[p(0, 1), p(0, 2)], None, 1).is_err());
    }
}
