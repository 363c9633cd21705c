use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::grid::GridPos;

/// Display colour of an ant's trail. Opaque to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AntColor(pub [u8; 3]);

impl AntColor {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self([rng.gen_range(0..255), rng.gen_range(0..255), rng.gen_range(0..255)])
    }
}

/// One forager. Its history starts at the nest and never holds a cell twice.
#[derive(Debug, Clone)]
pub struct Ant {
    position: GridPos,
    history: Vec<GridPos>,
    visited: HashSet<GridPos>,
    reached_reward: bool,
    color: AntColor,
}

impl Ant {
    pub fn new(origin: GridPos, color: AntColor) -> Self {
        Self {
            position: origin,
            history: vec![origin],
            visited: HashSet::from([origin]),
            reached_reward: false,
            color,
        }
    }

    /// Builds an ant that has already walked `path`. The last cell is its
    /// position; repeated cells are loop-erased as if walked one by one.
    pub fn from_path(path: &[GridPos], color: AntColor) -> Option<Self> {
        let (&first, rest) = path.split_first()?;
        let mut ant = Self::new(first, color);
        for &pos in rest {
            ant.move_to(pos);
        }
        Some(ant)
    }

    pub fn position(&self) -> GridPos {
        self.position
    }

    pub fn history(&self) -> &[GridPos] {
        &self.history
    }

    pub fn has_visited(&self, pos: GridPos) -> bool {
        self.visited.contains(&pos)
    }

    pub fn reached_reward(&self) -> bool {
        self.reached_reward
    }

    pub fn color(&self) -> AntColor {
        self.color
    }

    /// Moves to `pos` and records it. Returning to a cell already on the path
    /// cuts the path back to that cell instead of recording it twice.
    pub fn move_to(&mut self, pos: GridPos) {
        self.position = pos;
        if self.visited.insert(pos) {
            self.history.push(pos);
            return;
        }
        if let Some(first) = self.history.iter().position(|&p| p == pos) {
            for erased in self.history.drain(first + 1..) {
                self.visited.remove(&erased);
            }
        }
    }

    pub fn mark_reached(&mut self) {
        self.reached_reward = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREY: AntColor = AntColor([128, 128, 128]);

    #[test]
    fn starts_at_origin_with_single_cell_history() {
        let ant = Ant::new(GridPos::new(3, 4), GREY);
        assert_eq!(ant.position(), GridPos::new(3, 4));
        assert_eq!(ant.history(), &[GridPos::new(3, 4)]);
        assert!(ant.has_visited(GridPos::new(3, 4)));
        assert!(!ant.reached_reward());
    }

    #[test]
    fn moving_appends_to_history() {
        let mut ant = Ant::new(GridPos::new(0, 0), GREY);
        ant.move_to(GridPos::new(1, 0));
        ant.move_to(GridPos::new(2, 1));
        assert_eq!(
            ant.history(),
            &[GridPos::new(0, 0), GridPos::new(1, 0), GridPos::new(2, 1)]
        );
        assert_eq!(ant.position(), GridPos::new(2, 1));
    }

    #[test]
    fn revisiting_erases_the_loop() {
        let path = [
            GridPos::new(0, 0),
            GridPos::new(1, 0),
            GridPos::new(2, 0),
            GridPos::new(2, 1),
            GridPos::new(1, 1),
        ];
        let mut ant = Ant::from_path(&path, GREY).unwrap();
        ant.move_to(GridPos::new(1, 0));

        assert_eq!(ant.position(), GridPos::new(1, 0));
        assert_eq!(ant.history(), &[GridPos::new(0, 0), GridPos::new(1, 0)]);
        assert!(!ant.has_visited(GridPos::new(2, 1)));
        assert!(!ant.has_visited(GridPos::new(1, 1)));
    }

    #[test]
    fn random_colors_stay_below_255() {
        use rand::SeedableRng;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(3);
        for _ in 0..100 {
            let AntColor(rgb) = AntColor::random(&mut rng);
            assert!(rgb.iter().all(|&c| c < 255));
        }
    }
}
