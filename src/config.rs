use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::grid::{GridPos, GridSize};

/// Inset of the default reward cells from each corner of the grid.
const DEFAULT_REWARD_INSET: usize = 5;

/// Parameters of the simulation core. A running `Simulation` reads these only
/// at generation boundaries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the simulation RNG. `None` draws one from entropy.
    pub seed: Option<u64>,
    pub grid_width: usize,
    pub grid_height: usize,
    /// Reward cells the ants forage towards.
    pub rewards: Vec<GridPos>,
    pub ant_count: usize,

    // Pheromone parameters
    /// Fraction of pheromone removed per generation, in `[0, 1]`.
    pub evaporation: f64,
    /// Pheromone each ant spreads over its path at the end of a generation.
    pub pheromone_deposit: f64,
    /// Floor every cell of the field is kept at.
    pub min_pheromone: f64,

    // Transition rule exponents
    pub pheromone_weight: f64,
    pub heuristic_weight: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        let width = 50;
        let height = 50;
        Self {
            seed: None,
            grid_width: width,
            grid_height: height,
            rewards: corner_rewards(width, height, DEFAULT_REWARD_INSET),
            ant_count: 30,

            evaporation: 0.5,
            pheromone_deposit: 2.0,
            min_pheromone: 1.0,

            pheromone_weight: 6.429,
            heuristic_weight: 4.107,
        }
    }
}

/// Four reward cells, each `inset` cells in from a corner.
pub fn corner_rewards(width: usize, height: usize, inset: usize) -> Vec<GridPos> {
    let far_x = width.saturating_sub(inset);
    let far_y = height.saturating_sub(inset);
    vec![
        GridPos::new(inset, inset),
        GridPos::new(inset, far_y),
        GridPos::new(far_x, far_y),
        GridPos::new(far_x, inset),
    ]
}

impl SimConfig {
    pub fn grid_size(&self) -> GridSize {
        GridSize::new(self.grid_width, self.grid_height)
    }

    /// The colony nest: always the centre of the grid.
    pub fn origin(&self) -> GridPos {
        self.grid_size().center()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ant_count == 0 {
            return Err(ConfigError::invalid("ant_count must be greater than 0"));
        }
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::invalid(format!(
                "grid dimensions must be greater than 0 (got {}x{})",
                self.grid_width, self.grid_height
            )));
        }
        if self.grid_size().cell_count() < 2 {
            return Err(ConfigError::invalid("grid must contain at least two cells"));
        }
        if !self.evaporation.is_finite() || !(0.0..=1.0).contains(&self.evaporation) {
            return Err(ConfigError::invalid(format!(
                "evaporation must be within [0, 1] (got {})",
                self.evaporation
            )));
        }
        if !self.pheromone_deposit.is_finite() || self.pheromone_deposit < 0.0 {
            return Err(ConfigError::invalid(format!(
                "pheromone_deposit must be finite and non-negative (got {})",
                self.pheromone_deposit
            )));
        }
        if !self.min_pheromone.is_finite() || self.min_pheromone <= 0.0 {
            return Err(ConfigError::invalid(format!(
                "min_pheromone must be finite and positive (got {})",
                self.min_pheromone
            )));
        }
        if !self.pheromone_weight.is_finite() || !self.heuristic_weight.is_finite() {
            return Err(ConfigError::invalid("transition weights must be finite"));
        }
        if self.rewards.is_empty() {
            return Err(ConfigError::invalid("at least one reward cell is required"));
        }
        let size = self.grid_size();
        if let Some(outside) = self.rewards.iter().find(|&&r| !size.contains(r)) {
            return Err(ConfigError::invalid(format!(
                "reward ({}, {}) lies outside the {}x{} grid",
                outside.x, outside.y, self.grid_width, self.grid_height
            )));
        }
        Ok(())
    }
}

/// Settings of the bevy viewer. The simulation core never reads these.
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub window_width: f32,
    pub window_height: f32,
    /// Fixed-timestep rate the simulation is driven at.
    pub tick_rate_hz: f64,
    pub ticks_per_frame: u32,
    /// Directory heat-map PNGs are written to; disabled when `None`.
    pub snapshot_dir: Option<String>,
    pub snapshot_every: u64,
    pub snapshot_cell_px: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_width: 800.0,
            window_height: 800.0,
            tick_rate_hz: 100.0,
            ticks_per_frame: 1,
            snapshot_dir: None,
            snapshot_every: 1,
            snapshot_cell_px: 8,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub simulation: SimConfig,
    pub display: DisplayConfig,
}

impl AppConfig {
    /// Loads a JSON config file. Missing fields keep their defaults; the
    /// simulation section is validated before returning.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.simulation.validate()?;
        Ok(config)
    }
}
