use aco_trails::config::DisplayConfig;
use aco_trails::snapshot::SnapshotWriter;
use aco_trails::{GenerationSummary, GridPos, GridSize, TrailSegment};
use bevy::prelude::*;

#[derive(Component)]
pub struct PheromoneVisualization {
    pub cell: GridPos,
}

#[derive(Component)]
pub struct HudText;

/// Segments drawn since the current generation started. Cleared on every
/// generation boundary, like wiping the canvas.
#[derive(Resource, Default)]
pub struct TrailCanvas {
    pub segments: Vec<TrailSegment>,
}

#[derive(Resource, Default)]
pub struct SimControl {
    pub paused: bool,
}

#[derive(Resource)]
pub struct Snapshots(pub Option<SnapshotWriter>);

#[derive(Event)]
pub struct GenerationFinished(pub GenerationSummary);

/// Maps grid cells onto world space so the grid fills the window.
#[derive(Resource, Clone, Copy)]
pub struct GridLayout {
    pub size: GridSize,
    pub cell: Vec2,
    pub extent: Vec2,
}

impl GridLayout {
    pub fn new(size: GridSize, display: &DisplayConfig) -> Self {
        let extent = Vec2::new(display.window_width, display.window_height);
        Self {
            size,
            cell: extent / Vec2::new(size.width as f32, size.height as f32),
            extent,
        }
    }

    /// Centre of `cell` in world coordinates. Row 0 is at the top.
    pub fn to_world(&self, cell: GridPos) -> Vec2 {
        Vec2::new(
            (cell.x as f32 + 0.5) * self.cell.x - self.extent.x * 0.5,
            self.extent.y * 0.5 - (cell.y as f32 + 0.5) * self.cell.y,
        )
    }
}
