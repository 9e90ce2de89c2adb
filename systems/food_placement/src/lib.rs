#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded food placement system that picks a free cell uniformly at random.

use log::debug;
use rand::{seq::IteratorRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use snake_core::{CellCoord, Grid};
use thiserror::Error;

const SAMPLE_ATTEMPTS: usize = 64;

/// Configuration parameters required to construct the placement system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration that replays the same placements for a seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }

    /// Creates a configuration seeded from operating system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Seed used to initialise the generator.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

/// Pure system that chooses the next food cell.
#[derive(Debug)]
pub struct FoodPlacement {
    rng: ChaCha8Rng,
}

impl FoodPlacement {
    /// Creates a new placement system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Picks a cell the snake does not cover.
    ///
    /// A bounded number of uniform samples are drawn first; if they all land
    /// on the snake, the free cells are enumerated and one is chosen
    /// uniformly, so the call always terminates.
    pub fn place<F>(
        &mut self,
        grid: &Grid,
        is_occupied: F,
        occupied_count: usize,
    ) -> Result<CellCoord, FoodPlacementError>
    where
        F: Fn(CellCoord) -> bool,
    {
        if occupied_count >= grid.cell_count() {
            return Err(FoodPlacementError::BoardFull);
        }

        for _ in 0..SAMPLE_ATTEMPTS {
            let cell = CellCoord::new(
                self.rng.gen_range(0..grid.columns()),
                self.rng.gen_range(0..grid.rows()),
            );
            if !is_occupied(cell) {
                return Ok(cell);
            }
        }

        debug!("sampling exhausted after {SAMPLE_ATTEMPTS} attempts, enumerating free cells");
        grid.cells()
            .filter(|cell| !is_occupied(*cell))
            .choose(&mut self.rng)
            .ok_or(FoodPlacementError::BoardFull)
    }
}

impl Default for FoodPlacement {
    fn default() -> Self {
        Self::new(Config::from_entropy())
    }
}

/// Failures raised while placing food.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum FoodPlacementError {
    /// Every cell of the grid is covered by the snake.
    #[error("no free cell remains for food")]
    BoardFull,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_replays_same_cells() {
        let grid = Grid::default();
        let mut first = FoodPlacement::new(Config::new(7));
        let mut second = FoodPlacement::new(Config::new(7));

        for _ in 0..10 {
            assert_eq!(
                first.place(&grid, |_| false, 0),
                second.place(&grid, |_| false, 0)
            );
        }
    }

    #[test]
    fn full_board_is_reported() {
        let grid = Grid::new(2, 2).expect("valid grid");
        let mut placement = FoodPlacement::new(Config::new(1));

        assert_eq!(
            placement.place(&grid, |_| true, 4),
            Err(FoodPlacementError::BoardFull)
        );
    }

    #[test]
    fn single_free_cell_is_found_by_fallback() {
        let grid = Grid::new(20, 20).expect("valid grid");
        let free = CellCoord::new(13, 4);
        let mut placement = FoodPlacement::new(Config::new(99));

        for _ in 0..5 {
            assert_eq!(
                placement.place(&grid, |cell| cell != free, grid.cell_count() - 1),
                Ok(free)
            );
        }
    }

    #[test]
    fn inconsistent_count_still_terminates() {
        let grid = Grid::new(3, 3).expect("valid grid");
        let mut placement = FoodPlacement::new(Config::new(3));

        assert_eq!(
            placement.place(&grid, |_| true, 0),
            Err(FoodPlacementError::BoardFull)
        );
    }
}
