use bevy::log::info;
use bevy::prelude::Resource;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::colony::{Colony, TrailSegment, TransitionWeights};
use crate::config::SimConfig;
use crate::error::ConfigError;
use crate::heuristic::HeuristicField;
use crate::pheromones::{HeatMap, PheromoneGrid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColonyPhase {
    /// At least one ant is still foraging.
    Active,
    /// Every ant has found a reward; the next tick closes the generation.
    Converged,
}

/// Outcome of a finished generation, produced on the tick that closes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub generation: u64,
    /// Ticks the generation took, including the closing tick.
    pub ticks: u64,
    pub mean_path_len: f64,
    /// Field after evaporation and deposit.
    pub heat_map: HeatMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub segments: Vec<TrailSegment>,
    pub boundary: Option<GenerationSummary>,
}

/// The whole ant colony simulation: pheromone field, heuristic, the current
/// generation of ants and the RNG driving them.
#[derive(Resource)]
pub struct Simulation {
    config: SimConfig,
    pending: Option<SimConfig>,
    seed: u64,
    rng: ChaCha8Rng,
    field: PheromoneGrid,
    heuristic: HeuristicField,
    colony: Colony,
    phase: ColonyPhase,
    generation: u64,
    tick: u64,
    generation_start_tick: u64,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let field = PheromoneGrid::new(config.grid_size(), config.min_pheromone);
        let heuristic = HeuristicField::new(config.origin(), config.rewards.clone());
        let colony = Colony::new(config.origin(), config.ant_count, &mut rng);

        info!(
            "Simulation created: {}x{} grid, {} ants, {} rewards, seed {}",
            config.grid_width,
            config.grid_height,
            config.ant_count,
            config.rewards.len(),
            seed
        );

        Ok(Self {
            config,
            pending: None,
            seed,
            rng,
            field,
            heuristic,
            colony,
            phase: ColonyPhase::Active,
            generation: 0,
            tick: 0,
            generation_start_tick: 0,
        })
    }

    /// Parameters of the generation in flight.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Config waiting for the next generation boundary, if any.
    pub fn pending_config(&self) -> Option<&SimConfig> {
        self.pending.as_ref()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn field(&self) -> &PheromoneGrid {
        &self.field
    }

    pub fn heuristic(&self) -> &HeuristicField {
        &self.heuristic
    }

    pub fn colony(&self) -> &Colony {
        &self.colony
    }

    pub fn phase(&self) -> ColonyPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn heat_map(&self) -> HeatMap {
        self.field.heat_map()
    }

    /// Validates `config` and schedules it for the next generation. Replaces
    /// any config queued earlier.
    pub fn queue_config(&mut self, config: SimConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.pending = Some(config);
        Ok(())
    }

    /// Advances the simulation by one tick. Moves every foraging ant one cell,
    /// or, if the previous tick left the colony converged, closes the
    /// generation: evaporate, deposit, then spawn a fresh colony.
    pub fn tick(&mut self) -> TickReport {
        self.tick += 1;

        match self.phase {
            ColonyPhase::Converged => {
                let summary = self.finish_generation();
                TickReport {
                    tick: self.tick,
                    segments: Vec::new(),
                    boundary: Some(summary),
                }
            }
            ColonyPhase::Active => {
                let weights = TransitionWeights {
                    pheromone: self.config.pheromone_weight,
                    heuristic: self.config.heuristic_weight,
                };
                let segments =
                    self.colony
                        .step(&self.field, &self.heuristic, weights, &mut self.rng);
                if self.colony.is_converged() {
                    self.phase = ColonyPhase::Converged;
                }
                TickReport {
                    tick: self.tick,
                    segments,
                    boundary: None,
                }
            }
        }
    }

    fn finish_generation(&mut self) -> GenerationSummary {
        self.field.evaporate(self.config.evaporation);
        self.field
            .deposit(self.colony.histories(), self.config.pheromone_deposit);

        let ants = self.colony.ants().len().max(1);
        let path_cells: usize = self.colony.histories().map(<[_]>::len).sum();
        let summary = GenerationSummary {
            generation: self.generation,
            ticks: self.tick - self.generation_start_tick,
            mean_path_len: path_cells as f64 / ants as f64,
            heat_map: self.field.heat_map(),
        };
        info!(
            "Generation {} finished after {} ticks: mean path {:.1} cells, field max {:.3}",
            summary.generation, summary.ticks, summary.mean_path_len, summary.heat_map.max
        );

        self.apply_pending();
        self.generation += 1;
        self.start_generation();
        summary
    }

    /// Throws away the field and the current generation and starts over from
    /// generation 0, applying any queued config first.
    pub fn restart(&mut self) {
        self.apply_pending();
        self.field.clear();
        self.generation = 0;
        self.start_generation();
        info!("Simulation restarted");
    }

    fn start_generation(&mut self) {
        self.colony = Colony::new(self.config.origin(), self.config.ant_count, &mut self.rng);
        self.phase = ColonyPhase::Active;
        self.generation_start_tick = self.tick;
    }

    fn apply_pending(&mut self) {
        let Some(next) = self.pending.take() else {
            return;
        };
        if next.grid_size() != self.config.grid_size() || next.min_pheromone != self.config.min_pheromone {
            self.field = PheromoneGrid::new(next.grid_size(), next.min_pheromone);
        }
        self.heuristic = HeuristicField::new(next.origin(), next.rewards.clone());
        self.config = next;
        info!(
            "Applied new config: {} ants, evaporation {}, deposit {}, weights {}/{}",
            self.config.ant_count,
            self.config.evaporation,
            self.config.pheromone_deposit,
            self.config.pheromone_weight,
            self.config.heuristic_weight
        );
    }
}
