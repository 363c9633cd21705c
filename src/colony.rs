use bevy::log::debug;
use rand::seq::IteratorRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ant::{Ant, AntColor};
use crate::grid::{GridPos, GridSize};
use crate::heuristic::HeuristicField;
use crate::pheromones::PheromoneGrid;

/// Exponents of the transition rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionWeights {
    pub pheromone: f64,
    pub heuristic: f64,
}

/// A neighbouring cell an ant may step to, with its selection weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub position: GridPos,
    pub score: f64,
}

/// The step an ant took during one tick, for the renderer to draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailSegment {
    /// Index of the ant in its colony.
    pub ant: usize,
    pub from: GridPos,
    pub to: GridPos,
    pub color: AntColor,
    pub reached_reward: bool,
}

/// Unvisited in-bounds neighbours of the ant with their transition scores,
/// in the grid's row-major neighbourhood order.
pub fn candidates(
    ant: &Ant,
    size: GridSize,
    field: &PheromoneGrid,
    heuristic: &HeuristicField,
    weights: TransitionWeights,
) -> Vec<Candidate> {
    size.neighbours(ant.position())
        .filter(|&pos| !ant.has_visited(pos))
        .map(|pos| Candidate {
            position: pos,
            score: field.get(pos).powf(weights.pheromone)
                * heuristic.score(pos).powf(weights.heuristic),
        })
        .collect()
}

/// Roulette-wheel selection: a draw in `[0, total)` picks the first candidate
/// whose running score sum exceeds it. Infinite scores share the draw among
/// themselves; when nothing scores above zero the pick is uniform.
pub fn select_weighted<R: Rng + ?Sized>(candidates: &[Candidate], rng: &mut R) -> Option<GridPos> {
    let weight = |c: &Candidate| if c.score > 0.0 { c.score } else { 0.0 };
    let max = candidates.iter().map(weight).fold(0.0, f64::max);
    if max == f64::INFINITY {
        return candidates
            .iter()
            .filter(|c| c.score == f64::INFINITY)
            .choose(rng)
            .map(|c| c.position);
    }
    if max <= 0.0 {
        return candidates.iter().choose(rng).map(|c| c.position);
    }

    // Scores are scaled by the largest so the sum stays finite.
    let total: f64 = candidates.iter().map(|c| weight(c) / max).sum();
    let marker = rng.gen_range(0.0..total);
    let mut sum = 0.0;
    for candidate in candidates {
        sum += weight(candidate) / max;
        if sum > marker {
            return Some(candidate.position);
        }
    }
    candidates
        .iter()
        .rev()
        .find(|c| weight(*c) > 0.0)
        .map(|c| c.position)
}

/// All ants of the current generation.
#[derive(Debug, Clone)]
pub struct Colony {
    origin: GridPos,
    ants: Vec<Ant>,
}

impl Colony {
    /// A fresh generation of `ant_count` ants at `origin`, each with a random
    /// trail colour.
    pub fn new<R: Rng + ?Sized>(origin: GridPos, ant_count: usize, rng: &mut R) -> Self {
        let ants = (0..ant_count)
            .map(|_| Ant::new(origin, AntColor::random(rng)))
            .collect();
        Self { origin, ants }
    }

    pub fn from_ants(origin: GridPos, ants: Vec<Ant>) -> Self {
        Self { origin, ants }
    }

    pub fn origin(&self) -> GridPos {
        self.origin
    }

    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    pub fn histories(&self) -> impl Iterator<Item = &[GridPos]> {
        self.ants.iter().map(Ant::history)
    }

    pub fn active_count(&self) -> usize {
        self.ants.iter().filter(|ant| !ant.reached_reward()).count()
    }

    /// True once every ant has found a reward.
    pub fn is_converged(&self) -> bool {
        self.ants.iter().all(Ant::reached_reward)
    }

    /// Moves every ant that has not found a reward one cell. The field is only
    /// read here, so all ants of a generation see the same pheromone snapshot.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        field: &PheromoneGrid,
        heuristic: &HeuristicField,
        weights: TransitionWeights,
        rng: &mut R,
    ) -> Vec<TrailSegment> {
        let size = field.size();
        let mut segments = Vec::with_capacity(self.ants.len());

        for (idx, ant) in self.ants.iter_mut().enumerate() {
            if ant.reached_reward() {
                continue;
            }
            let from = ant.position();
            let options = candidates(ant, size, field, heuristic, weights);
            let next = match select_weighted(&options, rng) {
                Some(pos) => pos,
                None => match fallback_move(from, size, rng) {
                    Some(pos) => {
                        debug!("ant {idx} boxed in at ({}, {}), falling back", from.x, from.y);
                        pos
                    }
                    None => continue,
                },
            };

            ant.move_to(next);
            if heuristic.is_captured(next) {
                ant.mark_reached();
            }
            segments.push(TrailSegment {
                ant: idx,
                from,
                to: next,
                color: ant.color(),
                reached_reward: ant.reached_reward(),
            });
        }

        segments
    }
}

/// Uniformly random in-bounds neighbour, visited or not. Only `None` on a
/// single-cell grid.
pub fn fallback_move<R: Rng + ?Sized>(from: GridPos, size: GridSize, rng: &mut R) -> Option<GridPos> {
    size.neighbours(from).choose(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    const WEIGHTS: TransitionWeights = TransitionWeights {
        pheromone: 1.0,
        heuristic: 1.0,
    };
    const GREY: AntColor = AntColor([90, 90, 90]);

    fn candidate(x: usize, score: f64) -> Candidate {
        Candidate {
            position: GridPos::new(x, 0),
            score,
        }
    }

    #[test]
    fn roulette_follows_score_ratio() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let options = [candidate(0, 2.0), candidate(1, 1.0)];
        let trials = 10_000;
        let first = (0..trials)
            .filter(|_| select_weighted(&options, &mut rng) == Some(GridPos::new(0, 0)))
            .count();

        let expected = trials as f64 * 2.0 / 3.0;
        assert!(
            (first as f64 - expected).abs() < expected * 0.05,
            "first candidate chosen {first} times, expected about {expected}"
        );
    }

    #[test]
    fn roulette_never_picks_zero_score_candidates_when_others_score() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let options = [candidate(0, 0.0), candidate(1, 3.0), candidate(2, 0.0)];
        for _ in 0..1000 {
            assert_eq!(select_weighted(&options, &mut rng), Some(GridPos::new(1, 0)));
        }
    }

    #[test]
    fn roulette_handles_degenerate_totals() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(select_weighted(&[], &mut rng), None);

        let zeros = [candidate(0, 0.0), candidate(1, 0.0)];
        assert!(select_weighted(&zeros, &mut rng).is_some());

        let undefined = [candidate(0, f64::NAN), candidate(1, f64::NAN)];
        assert!(select_weighted(&undefined, &mut rng).is_some());
    }

    #[test]
    fn infinite_scores_dominate_the_draw() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let options = [
            candidate(0, f64::INFINITY),
            candidate(1, 1.0e300),
            candidate(2, f64::INFINITY),
        ];
        let picks: HashSet<_> = (0..1000)
            .filter_map(|_| select_weighted(&options, &mut rng))
            .collect();
        assert_eq!(picks, HashSet::from([GridPos::new(0, 0), GridPos::new(2, 0)]));
    }

    #[test]
    fn overflowing_totals_keep_score_ratio() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let options = [candidate(0, f64::MAX), candidate(1, f64::MAX / 4.0), candidate(2, 0.0)];
        let trials = 10_000;
        let first = (0..trials)
            .filter(|_| select_weighted(&options, &mut rng) == Some(GridPos::new(0, 0)))
            .count();

        let expected = trials as f64 * 0.8;
        assert!(
            (first as f64 - expected).abs() < expected * 0.05,
            "first candidate chosen {first} times, expected about {expected}"
        );
    }

    #[test]
    fn candidates_skip_visited_cells() {
        let size = GridSize::new(5, 5);
        let field = PheromoneGrid::new(size, 1.0);
        let heuristic = HeuristicField::new(GridPos::new(2, 2), vec![GridPos::new(4, 4)]);
        let ant = Ant::from_path(&[GridPos::new(2, 2), GridPos::new(3, 2)], GREY).unwrap();

        let options = candidates(&ant, size, &field, &heuristic, WEIGHTS);
        let cells: HashSet<_> = options.iter().map(|c| c.position).collect();
        assert_eq!(options.len(), 7);
        assert!(!cells.contains(&GridPos::new(2, 2)));
        assert!(!cells.contains(&GridPos::new(3, 2)));
    }

    #[test]
    fn candidate_score_combines_pheromone_and_heuristic() {
        let size = GridSize::new(5, 5);
        let mut field = PheromoneGrid::new(size, 1.0);
        let path = [GridPos::new(3, 3)];
        field.deposit([&path[..]], 1.0);
        let heuristic = HeuristicField::new(GridPos::new(2, 2), vec![GridPos::new(4, 4)]);
        let ant = Ant::new(GridPos::new(2, 2), GREY);
        let weights = TransitionWeights {
            pheromone: 2.0,
            heuristic: 3.0,
        };

        let options = candidates(&ant, size, &field, &heuristic, weights);
        let diagonal = options
            .iter()
            .find(|c| c.position == GridPos::new(3, 3))
            .unwrap();
        let expected = 2.0f64.powf(2.0) * heuristic.score(GridPos::new(3, 3)).powf(3.0);
        assert!((diagonal.score - expected).abs() < 1e-9);
    }

    #[test]
    fn boxed_in_ant_still_moves() {
        let size = GridSize::new(3, 3);
        let field = PheromoneGrid::new(size, 1.0);
        let heuristic = HeuristicField::new(GridPos::new(1, 1), vec![GridPos::new(2, 2)]);
        let path = [
            GridPos::new(1, 1),
            GridPos::new(1, 0),
            GridPos::new(0, 1),
            GridPos::new(0, 0),
        ];
        let ant = Ant::from_path(&path, GREY).unwrap();
        assert!(candidates(&ant, size, &field, &heuristic, WEIGHTS).is_empty());

        let mut colony = Colony::from_ants(GridPos::new(1, 1), vec![ant]);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let segments = colony.step(&field, &heuristic, WEIGHTS, &mut rng);

        let moved = &colony.ants()[0];
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].from, GridPos::new(0, 0));
        assert_ne!(moved.position(), GridPos::new(0, 0));
        assert!(size.contains(moved.position()));
        let unique: HashSet<_> = moved.history().iter().collect();
        assert_eq!(unique.len(), moved.history().len());
    }

    #[test]
    fn rewarded_ants_are_skipped() {
        let size = GridSize::new(5, 5);
        let field = PheromoneGrid::new(size, 1.0);
        let heuristic = HeuristicField::new(GridPos::new(2, 2), vec![GridPos::new(3, 3)]);
        let mut ant = Ant::from_path(&[GridPos::new(2, 2), GridPos::new(3, 2)], GREY).unwrap();
        ant.mark_reached();
        let mut colony = Colony::from_ants(GridPos::new(2, 2), vec![ant]);
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let segments = colony.step(&field, &heuristic, WEIGHTS, &mut rng);
        assert!(segments.is_empty());
        assert_eq!(colony.ants()[0].history().len(), 2);
        assert!(colony.is_converged());
    }

    #[test]
    fn fresh_colony_starts_at_origin() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let colony = Colony::new(GridPos::new(7, 8), 12, &mut rng);
        assert_eq!(colony.ants().len(), 12);
        assert_eq!(colony.active_count(), 12);
        assert!(!colony.is_converged());
        assert!(colony
            .histories()
            .all(|history| history == [GridPos::new(7, 8)]));
    }
}
