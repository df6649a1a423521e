//! Simulation core of a terminal snake game played on a wrap-around grid.
//!
//! The core owns no terminal state: a driver feeds one [`Input`] per tick into
//! [`GameState::tick`] and reads a [`Snapshot`] back for drawing.

mod board;
mod collision;
mod fruit;
mod mode;
mod settings;
mod snake;
mod state;

pub type Coord = u16;

pub use board::{Board, Position};
pub use collision::{detect, Collision};
pub use fruit::{FruitSet, FruitSpawner, OccupancyIndex};
pub use mode::{FruitMode, ModeController, Replenish};
pub use settings::Settings;
pub use snake::{Direction, Snake, Step};
pub use state::{EndReason, GameState, Input, Snapshot, Status};
