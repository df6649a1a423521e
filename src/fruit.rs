use std::ops::RangeInclusive;

use rand::seq::IteratorRandom;
use rand::Rng;
use tracing::debug;

use crate::board::{Board, Position};
use crate::snake::Snake;

/// Constant-time "is there a fruit on this cell" grid.
#[derive(Clone, Debug)]
pub struct OccupancyIndex {
    board: Board,
    cells: Vec<bool>,
}

impl OccupancyIndex {
    pub fn new(board: Board) -> Self {
        OccupancyIndex { board, cells: vec![false; board.cell_count()] }
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.board.contains(pos) && self.cells[self.board.index(pos)]
    }

    /// Returns `false` if the cell was already marked.
    pub fn insert(&mut self, pos: Position) -> bool {
        if !self.board.contains(pos) {
            return false;
        }
        let idx = self.board.index(pos);
        !std::mem::replace(&mut self.cells[idx], true)
    }

    /// Returns `false` if the cell was not marked.
    pub fn remove(&mut self, pos: Position) -> bool {
        if !self.board.contains(pos) {
            return false;
        }
        let idx = self.board.index(pos);
        std::mem::replace(&mut self.cells[idx], false)
    }
}

/// Fruit positions in placement order, mirrored into an [`OccupancyIndex`].
#[derive(Clone, Debug)]
pub struct FruitSet {
    positions: Vec<Position>,
    index: OccupancyIndex,
}

impl FruitSet {
    pub fn new(board: Board) -> Self {
        FruitSet { positions: Vec::new(), index: OccupancyIndex::new(board) }
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.index.contains(pos)
    }

    pub fn insert(&mut self, pos: Position) -> bool {
        if !self.index.insert(pos) {
            return false;
        }
        self.positions.push(pos);
        true
    }

    pub fn remove(&mut self, pos: Position) -> bool {
        if !self.index.remove(pos) {
            return false;
        }
        if let Some(i) = self.positions.iter().position(|p| *p == pos) {
            self.positions.swap_remove(i);
        }
        true
    }

    pub fn clear(&mut self) {
        for pos in self.positions.drain(..) {
            self.index.remove(pos);
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn as_slice(&self) -> &[Position] {
        &self.positions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter()
    }
}

/// Places fruit by rejection sampling on cells free of the snake and other fruit.
#[derive(Clone, Debug)]
pub struct FruitSpawner {
    board: Board,
    max_attempts: u32,
}

impl FruitSpawner {
    pub fn new(board: Board, max_attempts: u32) -> Self {
        FruitSpawner { board, max_attempts }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn is_occupied(&self, pos: Position, snake: &Snake, fruits: &FruitSet) -> bool {
        !self.board.contains(pos) || fruits.contains(pos) || snake.occupies(pos)
    }

    /// Samples up to `max_attempts` random cells and keeps the first free one.
    /// `None` means the board is (nearly) saturated, which is not an error.
    pub fn try_place_one<R: Rng + ?Sized>(
        &self,
        fruits: &mut FruitSet,
        snake: &Snake,
        rng: &mut R,
    ) -> Option<Position> {
        for _ in 0..self.max_attempts {
            let pos = Position::new(
                rng.gen_range(0..self.board.width()),
                rng.gen_range(0..self.board.height()),
            );

            if !self.is_occupied(pos, snake, fruits) {
                fruits.insert(pos);
                debug!(x = pos.x, y = pos.y, "fruit placed");
                return Some(pos);
            }
        }

        debug!(attempts = self.max_attempts, "no free cell found for fruit");
        None
    }

    /// Uniform choice over every free cell. Only fails on a full board.
    pub fn place_anywhere<R: Rng + ?Sized>(
        &self,
        fruits: &mut FruitSet,
        snake: &Snake,
        rng: &mut R,
    ) -> Option<Position> {
        let choice = self
            .board
            .cells()
            .filter(|pos| !self.is_occupied(*pos, snake, fruits))
            .choose(rng);

        if let Some(pos) = choice {
            fruits.insert(pos);
            debug!(x = pos.x, y = pos.y, "fruit placed on scan");
        }
        choice
    }

    /// Replaces every fruit with a fresh batch whose size is drawn from `count`.
    /// Stops at the first failed placement and returns how many were placed.
    pub fn regenerate<R: Rng + ?Sized>(
        &self,
        fruits: &mut FruitSet,
        snake: &Snake,
        count: RangeInclusive<usize>,
        rng: &mut R,
    ) -> usize {
        fruits.clear();

        let target = rng.gen_range(count);
        let mut placed = 0;
        while placed < target {
            if self.try_place_one(fruits, snake, rng).is_none() {
                break;
            }
            placed += 1;
        }

        debug!(target, placed, "fruit regenerated");
        placed
    }
}
