use serde::{Deserialize, Serialize};

use crate::snake::Direction;
use crate::Coord;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: Coord,
    pub y: Coord,
}

impl Position {
    pub fn new(x: Coord, y: Coord) -> Self {
        Position { x, y }
    }
}

/// Fixed toroidal grid. Leaving one edge re-enters at the opposite one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    width: Coord,
    height: Coord,
}

impl Board {
    pub fn new(width: Coord, height: Coord) -> Self {
        Board { width, height }
    }

    pub fn width(&self) -> Coord {
        self.width
    }

    pub fn height(&self) -> Coord {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn center(&self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Wraps arbitrary coordinates into `[0, width) x [0, height)`.
    pub fn normalize(&self, x: i32, y: i32) -> Position {
        let x = x.rem_euclid(self.width as i32);
        let y = y.rem_euclid(self.height as i32);
        Position::new(x as Coord, y as Coord)
    }

    /// The cell one unit away from `pos` in `dir`, wrapped.
    pub fn neighbor(&self, pos: Position, dir: Direction) -> Position {
        let (dx, dy) = dir.delta();
        self.normalize(pos.x as i32 + dx, pos.y as i32 + dy)
    }

    /// Row-major cell index, used by the occupancy grid.
    pub fn index(&self, pos: Position) -> usize {
        pos.y as usize * self.width as usize + pos.x as usize
    }

    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }
}
