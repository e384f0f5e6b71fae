//! Simulated annealing solver.
//!
//! # Algorithm
//!
//! Starts from the nearest-neighbor solution. Each iteration draws one of
//! the [`Move`](super::Move) operators; when the move applies, the neighbor
//! is accepted by the Metropolis criterion and the temperature is cooled
//! geometrically. A move that does not apply still spends an iteration but
//! makes no accept/reject decision and does not cool.
//!
//! # Reference
//!
//! Kirkpatrick, S., Gelatt, C.D. & Vecchi, M.P. (1983). "Optimization by
//! Simulated Annealing", *Science* 220(4598), 671-680.

use std::time::Instant;

use rand::Rng;
use tracing::debug;
use u_numflow::random::create_rng;

use crate::constructive::nearest_neighbor;
use crate::error::VrpError;
use crate::local_search::route_distance;
use crate::models::{Diagnostics, Problem, SolveResult};
use crate::solver::{finish, VrpSolver};

use super::config::AnnealingConfig;
use super::moves::random_neighbor;

/// Simulated annealing over swap, relocate and 2-opt moves.
///
/// # Examples
///
/// ```
/// use qfleet_routing::annealing::{AnnealingConfig, AnnealingSolver};
/// use qfleet_routing::models::Problem;
/// use qfleet_routing::solver::VrpSolver;
///
/// let problem = Problem::from_points(
///     &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0), (2.0, 2.0)], 2, 0,
/// ).expect("valid");
/// let result = AnnealingSolver::new(AnnealingConfig::default().with_seed(1))
///     .solve(&problem)
///     .expect("solves");
/// assert!(result.is_valid);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnnealingSolver {
    config: AnnealingConfig,
}

/// Raw outcome of an annealing run.
#[derive(Debug, Clone)]
pub struct AnnealingOutcome {
    /// Best customer sequences found.
    pub routes: Vec<Vec<usize>>,
    /// Their total distance.
    pub cost: f64,
    /// Iterations consumed.
    pub iterations: usize,
    /// Temperature at termination.
    pub final_temperature: f64,
    /// Accepted moves.
    pub accepted_moves: usize,
}

impl AnnealingSolver {
    /// Display name.
    pub const NAME: &'static str = "Simulated Annealing";

    /// Creates a solver with the given configuration.
    pub fn new(config: AnnealingConfig) -> Self {
        Self { config }
    }

    /// Runs the annealing loop from `initial`.
    pub fn anneal(&self, problem: &Problem, initial: Vec<Vec<usize>>) -> AnnealingOutcome {
        let config = &self.config;
        let depot = problem.depot();
        let distances = problem.distances();
        let cost_of = |routes: &[Vec<usize>]| -> f64 {
            routes
                .iter()
                .map(|r| route_distance(r, depot, distances))
                .sum()
        };

        let mut rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };

        let mut current_cost = cost_of(&initial);
        let mut current = initial;
        let mut best = current.clone();
        let mut best_cost = current_cost;

        let mut temperature = config.initial_temp;
        let mut iterations = 0usize;
        let mut accepted_moves = 0usize;

        while temperature > config.final_temp && iterations < config.max_iterations {
            iterations += 1;

            let Some(neighbor) = random_neighbor(&current, depot, distances, &mut rng) else {
                continue;
            };
            let neighbor_cost = cost_of(&neighbor);
            let delta = neighbor_cost - current_cost;

            // Metropolis acceptance criterion
            let accept = delta < 0.0 || rng.random_range(0.0..1.0) < (-delta / temperature).exp();

            if accept {
                current = neighbor;
                current_cost = neighbor_cost;
                accepted_moves += 1;

                if current_cost < best_cost {
                    best = current.clone();
                    best_cost = current_cost;
                }
            }

            temperature *= config.cooling_rate;
        }

        AnnealingOutcome {
            routes: best,
            cost: best_cost,
            iterations,
            final_temperature: temperature,
            accepted_moves,
        }
    }
}

impl VrpSolver for AnnealingSolver {
    fn name(&self) -> String {
        Self::NAME.to_string()
    }

    fn solve(&self, problem: &Problem) -> Result<SolveResult, VrpError> {
        self.config.validate()?;
        let start = Instant::now();

        let outcome = self.anneal(problem, nearest_neighbor(problem));
        debug!(
            iterations = outcome.iterations,
            accepted = outcome.accepted_moves,
            cost = outcome.cost,
            "simulated annealing finished"
        );

        let diagnostics = Diagnostics::Annealing {
            iterations: outcome.iterations,
            final_temperature: outcome.final_temperature,
            accepted_moves: outcome.accepted_moves,
        };
        Ok(finish(problem, outcome.routes, start, Self::NAME, diagnostics))
    }
}
