//! Genetic algorithm configuration.

use serde::{Deserialize, Serialize};

use crate::error::VrpError;

/// Configuration for [`GeneticSolver`](super::GeneticSolver).
///
/// # Examples
///
/// ```
/// use qfleet_routing::ga::GeneticConfig;
///
/// let config = GeneticConfig::default()
///     .with_population_size(30)
///     .with_generations(40)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.elite_size, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticConfig {
    /// Individuals per generation. Must be at least 2.
    pub population_size: usize,

    /// Generations to evolve. Zero returns the best initial individual.
    pub generations: usize,

    /// Probability that an offspring receives a swap mutation.
    pub mutation_rate: f64,

    /// Probability that two parents are recombined rather than cloned.
    pub crossover_rate: f64,

    /// Individuals carried unchanged into the next generation.
    ///
    /// Clamped to `population_size - 1`.
    pub elite_size: usize,

    /// Tournament size for parent selection.
    pub tournament_size: usize,

    /// Polish each route with 2-opt during evaluation.
    pub local_search: bool,

    /// Seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            mutation_rate: 0.1,
            crossover_rate: 1.0,
            elite_size: 20,
            tournament_size: 3,
            local_search: false,
            seed: None,
        }
    }
}

impl GeneticConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of generations.
    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the elite count.
    pub fn with_elite_size(mut self, n: usize) -> Self {
        self.elite_size = n;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Enables or disables 2-opt polishing.
    pub fn with_local_search(mut self, enabled: bool) -> Self {
        self.local_search = enabled;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Elite count after clamping to leave room for offspring.
    pub fn effective_elite_size(&self) -> usize {
        self.elite_size.min(self.population_size.saturating_sub(1))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), VrpError> {
        if self.population_size < 2 {
            return Err(VrpError::InvalidConfig(
                "population_size must be at least 2".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(VrpError::InvalidConfig(
                "mutation_rate must be in [0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(VrpError::InvalidConfig(
                "crossover_rate must be in [0, 1]".into(),
            ));
        }
        if self.tournament_size == 0 {
            return Err(VrpError::InvalidConfig(
                "tournament_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
