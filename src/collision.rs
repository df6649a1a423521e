use crate::fruit::FruitSet;
use crate::snake::Snake;

/// Outcome of testing the head after a move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Collision {
    Clear,
    Body,
    Fruit,
}

/// Self-collision wins over fruit: a head on its own body ends the game
/// before anything is eaten.
pub fn detect(snake: &Snake, fruits: &FruitSet) -> Collision {
    let head = snake.head();

    if snake.body().contains(&head) {
        Collision::Body
    } else if fruits.contains(head) {
        Collision::Fruit
    } else {
        Collision::Clear
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Position};
    use crate::snake::Direction::*;

    fn p(x: u16, y: u16) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn clear_cell() {
        let board = Board::new(5, 5);
        let snake = Snake::from_parts(p(2, 2), &[p(1, 2)], Some(Right), 4).unwrap();
        let fruits = FruitSet::new(board);
        assert_eq!(detect(&snake, &fruits), Collision::Clear);
    }

    #[test]
    fn head_on_fruit() {
        let board = Board::new(5, 5);
        let snake = Snake::new(p(2, 2), 4);
        let mut fruits = FruitSet::new(board);
        fruits.insert(p(2, 2));
        assert_eq!(detect(&snake, &fruits), Collision::Fruit);
    }

    #[test]
    fn body_checked_before_fruit() {
        let board = Board::new(5, 5);
        // A square loop: moving up from (1, 2) lands on the segment at (1, 1).
        let mut snake =
            Snake::from_parts(p(1, 2), &[p(2, 2), p(2, 1), p(1, 1), p(0, 1)], Some(Left), 8)
                .unwrap();
        snake.apply_direction(Up);
        snake.step(&board);

        let mut fruits = FruitSet::new(board);
        fruits.insert(snake.head());
        assert_eq!(detect(&snake, &fruits), Collision::Body);
    }

    #[test]
    fn moving_into_the_vacated_tail_is_safe() {
        let board = Board::new(5, 5);
        let mut snake =
            Snake::from_parts(p(1, 1), &[p(2, 1), p(2, 2), p(1, 2)], Some(Left), 8).unwrap();
        snake.apply_direction(Down);
        snake.step(&board);

        assert_eq!(snake.head(), p(1, 2));
        assert_eq!(detect(&snake, &FruitSet::new(board)), Collision::Clear);
    }
}
