use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::grid::{GridPos, GridSize};

/// Pheromone intensity per grid cell. Every cell is kept at or above `floor`.
#[derive(Debug, Clone)]
pub struct PheromoneGrid {
    size: GridSize,
    floor: f64,
    cells: Vec<f64>,
}

impl PheromoneGrid {
    pub fn new(size: GridSize, floor: f64) -> Self {
        Self {
            size,
            floor,
            cells: vec![floor; size.cell_count()],
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Intensity at `pos`; cells outside the grid read as the floor.
    pub fn get(&self, pos: GridPos) -> f64 {
        self.size
            .index(pos)
            .map_or(self.floor, |idx| self.cells[idx])
    }

    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    pub fn total(&self) -> f64 {
        self.cells.iter().sum()
    }

    pub fn max(&self) -> f64 {
        self.cells.iter().copied().fold(self.floor, f64::max)
    }

    /// Multiplicative decay of the whole field, clamped at the floor.
    pub fn evaporate(&mut self, rate: f64) {
        let floor = self.floor;
        let keep = 1.0 - rate;
        self.cells
            .par_iter_mut()
            .for_each(|val| *val = (keep * *val).max(floor));
    }

    /// Spreads `amount` evenly over each history, so every ant adds exactly
    /// `amount` to the field regardless of how long its path was.
    pub fn deposit<'a, I>(&mut self, histories: I, amount: f64)
    where
        I: IntoIterator<Item = &'a [GridPos]>,
    {
        for history in histories {
            if history.is_empty() {
                continue;
            }
            let share = amount / history.len() as f64;
            for &pos in history {
                if let Some(idx) = self.size.index(pos) {
                    self.cells[idx] += share;
                }
            }
        }
    }

    /// Resets every cell back to the floor.
    pub fn clear(&mut self) {
        self.cells.fill(self.floor);
    }

    /// Intensities normalised to `[0, 1]` between the floor and the current
    /// maximum.
    pub fn heat_map(&self) -> HeatMap {
        let max = self.max();
        let span = max - self.floor;
        let values = if span > 0.0 {
            self.cells
                .par_iter()
                .map(|&v| ((v - self.floor) / span).clamp(0.0, 1.0) as f32)
                .collect()
        } else {
            vec![0.0; self.cells.len()]
        };
        HeatMap {
            size: self.size,
            max,
            values,
        }
    }
}

/// Normalised snapshot of the pheromone field for heat-map rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatMap {
    pub size: GridSize,
    /// Raw maximum the values were normalised against.
    pub max: f64,
    pub values: Vec<f32>,
}

impl HeatMap {
    pub fn get(&self, pos: GridPos) -> f32 {
        self.size.index(pos).map_or(0.0, |idx| self.values[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn grid(width: usize, height: usize) -> PheromoneGrid {
        PheromoneGrid::new(GridSize::new(width, height), 1.0)
    }

    #[test]
    fn starts_at_floor() {
        let field = grid(4, 3);
        assert_eq!(field.cells().len(), 12);
        assert!(field.cells().iter().all(|&v| v == 1.0));
        assert_eq!(field.get(GridPos::new(10, 10)), 1.0);
    }

    #[test]
    fn evaporation_at_floor_is_idempotent() {
        let mut field = grid(6, 6);
        let before = field.cells().to_vec();
        for _ in 0..10 {
            field.evaporate(0.5);
        }
        field.evaporate(1.0);
        field.evaporate(0.0);
        assert_eq!(field.cells(), before.as_slice());
    }

    #[test]
    fn evaporation_decays_towards_floor() {
        let mut field = grid(3, 3);
        let path = [GridPos::new(1, 1)];
        field.deposit([&path[..]], 9.0);
        assert_eq!(field.get(GridPos::new(1, 1)), 10.0);

        field.evaporate(0.5);
        assert_eq!(field.get(GridPos::new(1, 1)), 5.0);
        field.evaporate(0.9);
        assert_eq!(field.get(GridPos::new(1, 1)), 1.0);
    }

    #[test]
    fn deposit_conserves_amount_per_ant() {
        let mut field = grid(10, 10);
        let short = vec![GridPos::new(5, 5)];
        let medium = vec![GridPos::new(5, 5), GridPos::new(6, 5), GridPos::new(7, 6)];
        let long: Vec<_> = (0..7).map(|i| GridPos::new(i, 2)).collect();
        let before = field.total();

        field.deposit([short.as_slice(), medium.as_slice(), long.as_slice()], 2.5);

        let added = field.total() - before;
        assert!((added - 2.5 * 3.0).abs() < 1e-9);
        // Shorter paths concentrate their share.
        assert!((field.get(GridPos::new(6, 5)) - (1.0 + 2.5 / 3.0)).abs() < 1e-12);
        assert!((field.get(GridPos::new(1, 2)) - (1.0 + 2.5 / 7.0)).abs() < 1e-12);
    }

    #[test]
    fn deposit_skips_empty_histories() {
        let mut field = grid(2, 2);
        let empty: Vec<GridPos> = Vec::new();
        field.deposit([empty.as_slice()], 4.0);
        assert_eq!(field.total(), 4.0);
    }

    #[test]
    fn floor_holds_under_random_updates() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let size = GridSize::new(8, 8);
        let mut field = PheromoneGrid::new(size, 0.25);

        for _ in 0..500 {
            if rng.gen_bool(0.5) {
                field.evaporate(rng.gen_range(0.0..=1.0));
            } else {
                let len = rng.gen_range(1..20);
                let path: Vec<_> = (0..len)
                    .map(|_| GridPos::new(rng.gen_range(0..8), rng.gen_range(0..8)))
                    .collect();
                field.deposit([path.as_slice()], rng.gen_range(0.0..5.0));
            }
            assert!(field.cells().iter().all(|&v| v >= 0.25));
        }
    }

    #[test]
    fn heat_map_normalises_between_floor_and_max() {
        let mut field = grid(3, 1);
        let hot = [GridPos::new(0, 0)];
        let warm = [GridPos::new(1, 0), GridPos::new(1, 0)];
        field.deposit([&hot[..]], 4.0);
        field.deposit([&warm[..]], 2.0);

        let heat = field.heat_map();
        assert_eq!(heat.max, 5.0);
        assert_eq!(heat.get(GridPos::new(0, 0)), 1.0);
        assert_eq!(heat.get(GridPos::new(1, 0)), 0.5);
        assert_eq!(heat.get(GridPos::new(2, 0)), 0.0);
    }

    #[test]
    fn flat_field_has_empty_heat_map() {
        let heat = grid(4, 4).heat_map();
        assert!(heat.values.iter().all(|&v| v == 0.0));
    }
}
