use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::mode::FruitMode;
use crate::Coord;

pub const DEFAULT_WIDTH: Coord = 80;
pub const DEFAULT_HEIGHT: Coord = 20;
pub const DEFAULT_MAX_FRUITS: usize = 12;
pub const DEFAULT_MAX_SNAKE_LENGTH: usize = 400;
pub const DEFAULT_MAX_FRUIT_ATTEMPTS: u32 = 100;

/// Session configuration, fixed once a game starts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub width: Coord,
    pub height: Coord,
    pub fruit_mode: FruitMode,
    pub max_fruits: usize,
    pub max_snake_length: usize,
    pub max_fruit_attempts: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fruit_mode: FruitMode::Normal,
            max_fruits: DEFAULT_MAX_FRUITS,
            max_snake_length: DEFAULT_MAX_SNAKE_LENGTH,
            max_fruit_attempts: DEFAULT_MAX_FRUIT_ATTEMPTS,
        }
    }
}

impl Settings {
    pub fn board(&self) -> Board {
        Board::new(self.width, self.height)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.width < 2 || self.height < 2 {
            return Err(format!(
                "Board must be at least 2x2, got {}x{}",
                self.width, self.height
            ));
        }
        if self.max_fruits < 4 {
            return Err("Max fruit count must be at least 4".to_string());
        }
        if self.max_snake_length == 0 {
            return Err("Max snake length must be at least 1".to_string());
        }
        if self.max_fruit_attempts == 0 {
            return Err("Fruit placement attempts must be at least 1".to_string());
        }
        Ok(())
    }
}
