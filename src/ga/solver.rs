//! Genetic algorithm solver.

use std::time::Instant;

use tracing::debug;
use u_metaheur::ga::{GaConfig, GaProblem, GaRunner, Individual, Selection};
use u_numflow::random::create_rng;

use crate::error::VrpError;
use crate::models::{Diagnostics, Problem, SolveResult};
use crate::solver::{finish, VrpSolver};

use super::chromosome::VisitOrder;
use super::config::GeneticConfig;
use super::problem::VrpGaProblem;

/// Evolves visiting orders with tournament selection, OX crossover, swap
/// mutation and elitism for a fixed number of generations.
///
/// Internally the engine minimizes total distance. The reported
/// `best_fitness` is `1 / (1 + cost)` so that higher is better.
///
/// # Examples
///
/// ```
/// use qfleet_routing::ga::{GeneticConfig, GeneticSolver};
/// use qfleet_routing::models::Problem;
/// use qfleet_routing::solver::VrpSolver;
///
/// let problem = Problem::from_points(
///     &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)], 2, 0,
/// ).expect("valid");
/// let solver = GeneticSolver::new(GeneticConfig::default().with_seed(42));
/// let result = solver.solve(&problem).expect("solves");
/// assert!(result.is_valid);
/// assert!(result.solution.num_routes() <= 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GeneticSolver {
    config: GeneticConfig,
}

impl GeneticSolver {
    /// Display name.
    pub const NAME: &'static str = "Genetic Algorithm";

    /// Creates a solver with the given configuration.
    pub fn new(config: GeneticConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &GeneticConfig {
        &self.config
    }

    fn engine_config(&self) -> GaConfig {
        let c = &self.config;
        let elite = c.effective_elite_size();
        // The engine floors `population * ratio`; the half offsets rounding.
        let elite_ratio = (elite as f64 + 0.5) / c.population_size as f64;
        let mut config = GaConfig::default()
            .with_population_size(c.population_size)
            .with_max_generations(c.generations)
            .with_selection(Selection::Tournament(c.tournament_size))
            .with_elite_ratio(elite_ratio)
            .with_crossover_rate(c.crossover_rate)
            .with_mutation_rate(c.mutation_rate)
            .with_stagnation_limit(0)
            .with_parallel(false);
        if let Some(seed) = c.seed {
            config = config.with_seed(seed);
        }
        config
    }

    /// Best of a freshly drawn population, used when no generation runs.
    fn initial_best(&self, ga: &VrpGaProblem) -> VisitOrder {
        let mut rng = match self.config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };
        let mut best = ga.create_individual(&mut rng);
        best.set_fitness(ga.evaluate(&best));
        for _ in 1..self.config.population_size {
            let mut ind = ga.create_individual(&mut rng);
            ind.set_fitness(ga.evaluate(&ind));
            if ind.fitness() < best.fitness() {
                best = ind;
            }
        }
        best
    }
}

impl VrpSolver for GeneticSolver {
    fn name(&self) -> String {
        Self::NAME.to_string()
    }

    fn solve(&self, problem: &Problem) -> Result<SolveResult, VrpError> {
        self.config.validate()?;
        let start = Instant::now();
        let ga = VrpGaProblem::new(problem).with_local_search(self.config.local_search);

        let (best, generations) = if ga.num_customers() == 0 {
            (VisitOrder::new(Vec::new()), 0)
        } else if self.config.generations == 0 {
            (self.initial_best(&ga), 0)
        } else {
            let result =
                GaRunner::run(&ga, &self.engine_config()).map_err(VrpError::InvalidConfig)?;
            (result.best, result.generations)
        };

        let routes = ga.decode(&best);
        let cost = ga.cost_of(&routes);
        debug!(generations, cost, "genetic algorithm finished");

        let diagnostics = Diagnostics::Genetic {
            generations,
            population_size: self.config.population_size,
            best_fitness: 1.0 / (1.0 + cost),
        };
        Ok(finish(problem, routes, start, Self::NAME, diagnostics))
    }
}
