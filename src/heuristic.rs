use crate::grid::GridPos;

/// Ants within this distance of a reward have found it.
pub const CAPTURE_RADIUS: f64 = 1.0;

/// Static desirability of cells: grows with distance from the nest and
/// with proximity to the nearest reward.
#[derive(Debug, Clone)]
pub struct HeuristicField {
    origin: GridPos,
    rewards: Vec<GridPos>,
}

impl HeuristicField {
    pub fn new(origin: GridPos, rewards: Vec<GridPos>) -> Self {
        Self { origin, rewards }
    }

    pub fn origin(&self) -> GridPos {
        self.origin
    }

    pub fn rewards(&self) -> &[GridPos] {
        &self.rewards
    }

    /// Distance to the closest reward, never less than 1.
    pub fn nearest_reward_distance(&self, cell: GridPos) -> f64 {
        self.rewards
            .iter()
            .map(|&reward| cell.distance(reward))
            .fold(f64::INFINITY, f64::min)
            .max(1.0)
    }

    /// Distance from the nest over distance to the nearest reward. Cells far
    /// from the nest score high even before a reward is close, so ants fan
    /// outwards instead of heading straight for the nearest reward.
    pub fn score(&self, cell: GridPos) -> f64 {
        cell.distance(self.origin) / self.nearest_reward_distance(cell)
    }

    pub fn is_captured(&self, cell: GridPos) -> bool {
        self.rewards
            .iter()
            .any(|&reward| cell.distance(reward) <= CAPTURE_RADIUS)
    }
}
