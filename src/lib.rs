//! Ant colony pheromone-trail simulation on a discrete grid.
//!
//! Ants leave the nest at the grid centre and step between neighbouring cells,
//! choosing by pheromone intensity and a distance heuristic until every ant
//! has found a reward. The finished generation's paths then reinforce the
//! field, which also evaporates, and a new generation starts.

pub mod ant;
pub mod colony;
pub mod colors;
pub mod config;
pub mod error;
pub mod grid;
pub mod heuristic;
pub mod pheromones;
pub mod simulation;
pub mod snapshot;

pub use ant::{Ant, AntColor};
pub use colony::{Colony, TrailSegment};
pub use config::{AppConfig, DisplayConfig, SimConfig};
pub use error::{ConfigError, SnapshotError};
pub use grid::{GridPos, GridSize};
pub use pheromones::{HeatMap, PheromoneGrid};
pub use simulation::{ColonyPhase, GenerationSummary, Simulation, TickReport};
