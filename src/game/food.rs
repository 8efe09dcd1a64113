use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::grid::{CellCoord, GridSpec};

/// Where the food currently is, if anywhere
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodState {
    Available(CellCoord),
    /// Every cell is occupied by the snake
    Exhausted,
}

impl FoodState {
    pub fn has_food(&self) -> bool {
        matches!(self, FoodState::Available(_))
    }

    pub fn location(&self) -> Option<CellCoord> {
        match self {
            FoodState::Available(cell) => Some(*cell),
            FoodState::Exhausted => None,
        }
    }
}

/// Chooses the next food cell given the cells the snake covers.
pub trait FoodProvider {
    fn respawn(&mut self, grid: &GridSpec, occupied: &HashSet<CellCoord>) -> FoodState;
}

/// Places food uniformly at random among the free cells
pub struct RandomFoodProvider<R: Rng = StdRng> {
    rng: R,
}

impl<R: Rng> RandomFoodProvider<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomFoodProvider<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> FoodProvider for RandomFoodProvider<R> {
    fn respawn(&mut self, grid: &GridSpec, occupied: &HashSet<CellCoord>) -> FoodState {
        let free: Vec<CellCoord> = grid.cells().filter(|c| !occupied.contains(c)).collect();

        match free.choose(&mut self.rng) {
            Some(cell) => FoodState::Available(*cell),
            None => FoodState::Exhausted,
        }
    }
}
