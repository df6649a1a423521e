use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Ticks the ambient timer must exceed before a reshuffle roll.
pub const RESHUFFLE_INTERVAL: u32 = 50;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FruitMode {
    #[default]
    Normal,
    Random,
}

/// Fruit work to do, applied in field order: `place` single placements, then
/// an optional full regeneration, then `place_after` more placements.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Replenish {
    pub place: u8,
    pub regenerate: bool,
    pub place_after: u8,
}

impl Replenish {
    pub const NONE: Replenish = Replenish { place: 0, regenerate: false, place_after: 0 };

    pub fn is_none(&self) -> bool {
        *self == Replenish::NONE
    }
}

/// Replenishment policy, fixed for the whole session.
#[derive(Clone, Debug)]
pub struct ModeController {
    mode: FruitMode,
    max_fruits: usize,
    reshuffle_timer: u32,
}

impl ModeController {
    pub fn new(mode: FruitMode, max_fruits: usize) -> Self {
        ModeController { mode, max_fruits, reshuffle_timer: 0 }
    }

    pub fn mode(&self) -> FruitMode {
        self.mode
    }

    pub fn is_random(&self) -> bool {
        self.mode == FruitMode::Random
    }

    pub fn max_fruits(&self) -> usize {
        self.max_fruits
    }

    pub fn reshuffle_timer(&self) -> u32 {
        self.reshuffle_timer
    }

    /// How many fruit a regeneration aims for.
    pub fn count_range(&self) -> RangeInclusive<usize> {
        match self.mode {
            FruitMode::Normal => 2..=self.max_fruits / 2,
            FruitMode::Random => 1..=self.max_fruits,
        }
    }

    pub fn on_eat<R: Rng + ?Sized>(&self, rng: &mut R) -> Replenish {
        match self.mode {
            FruitMode::Normal => {
                let bonus = rng.gen_ratio(1, 4);
                let regenerate = rng.gen_ratio(1, 10);
                Replenish { place: 1 + bonus as u8, regenerate, place_after: 0 }
            }
            FruitMode::Random => {
                let double = rng.gen_ratio(40, 100);
                let regenerate = rng.gen_ratio(30, 100);
                let extra = rng.gen_ratio(20, 100);
                Replenish {
                    place: if double { 2 } else { 1 },
                    regenerate,
                    place_after: extra as u8,
                }
            }
        }
    }

    /// Work done on every running tick regardless of eating. Normal mode has none.
    pub fn on_tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Replenish {
        if self.mode == FruitMode::Normal {
            return Replenish::NONE;
        }

        self.reshuffle_timer += 1;
        let mut regenerate = false;
        if self.reshuffle_timer > RESHUFFLE_INTERVAL {
            regenerate = rng.gen_ratio(15, 100);
            self.reshuffle_timer = 0;
        }

        let extra = rng.gen_ratio(5, 100);
        Replenish { place: 0, regenerate, place_after: extra as u8 }
    }
}
