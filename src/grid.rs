use serde::{Deserialize, Serialize};

/// A cell of the simulation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: usize,
    pub y: usize,
}

impl GridPos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in grid units.
    pub fn distance(self, other: GridPos) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Row-major index of `pos`, or `None` when it lies outside the grid.
    pub fn index(&self, pos: GridPos) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.y * self.width + pos.x)
        } else {
            None
        }
    }

    pub fn position(&self, index: usize) -> GridPos {
        GridPos::new(index % self.width, index / self.width)
    }

    pub fn center(&self) -> GridPos {
        GridPos::new(self.width / 2, self.height / 2)
    }

    /// The in-bounds cells of the 3x3 box around `pos`, excluding `pos` itself,
    /// in a fixed row-major order.
    pub fn neighbours(&self, pos: GridPos) -> impl Iterator<Item = GridPos> {
        let size = *self;
        let x_min = pos.x.saturating_sub(1);
        let x_max = (pos.x + 1).min(size.width.saturating_sub(1));
        let y_min = pos.y.saturating_sub(1);
        let y_max = (pos.y + 1).min(size.height.saturating_sub(1));

        (y_min..=y_max)
            .flat_map(move |y| (x_min..=x_max).map(move |x| GridPos::new(x, y)))
            .filter(move |&cell| cell != pos && size.contains(cell))
    }
}
