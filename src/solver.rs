//! Solver contract, construction by name and side-by-side comparison.
//!
//! Every algorithm implements [`VrpSolver`]. [`Algorithm`] names one of them
//! together with its configuration; a [`SolverContext`] turns it into a
//! boxed solver sharing the context's quantum backend and cost-model cache.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::annealing::{AnnealingConfig, AnnealingSolver};
use crate::constructive::NearestNeighborSolver;
use crate::error::VrpError;
use crate::evaluation::validate;
use crate::exact::{BnbConfig, BranchAndBoundSolver};
use crate::ga::{GeneticConfig, GeneticSolver};
use crate::models::{Diagnostics, Problem, SolveResult, Solution};
use crate::optim::OptimizerKind;
use crate::qaoa::{QaoaConfig, QaoaSolver};
use crate::quantum::QuantumBackend;
use crate::qubo::CostModelCache;

/// A routing algorithm.
pub trait VrpSolver: Send + Sync {
    /// Display name.
    fn name(&self) -> String;

    /// Solves `problem`. Invalid solutions are reported through
    /// [`SolveResult::is_valid`], not as errors.
    fn solve(&self, problem: &Problem) -> Result<SolveResult, VrpError>;
}

/// Validates `routes` and packages them as a [`SolveResult`].
pub fn finish(
    problem: &Problem,
    routes: Vec<Vec<usize>>,
    start: Instant,
    algorithm: &str,
    diagnostics: Diagnostics,
) -> SolveResult {
    let depot = problem.depot();
    let solution = Solution::from_sequences(depot, routes);
    let report = validate(&solution, problem.distances(), depot);
    if !report.is_valid {
        warn!(
            algorithm,
            unvisited = ?report.unvisited,
            duplicates = ?report.duplicates,
            "solver produced an invalid solution"
        );
    }
    SolveResult {
        solution,
        total_cost: report.total_cost,
        execution_time: start.elapsed().as_secs_f64(),
        algorithm: algorithm.to_string(),
        is_valid: report.is_valid,
        diagnostics,
    }
}

/// Every algorithm the crate provides, with its configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Algorithm {
    /// Greedy construction, no configuration.
    NearestNeighbor,
    /// Giant-tour genetic algorithm.
    Genetic(GeneticConfig),
    /// Simulated annealing from a nearest-neighbor start.
    SimulatedAnnealing(AnnealingConfig),
    /// Exhaustive search for small instances.
    BranchAndBound(BnbConfig),
    /// QAOA with the classical fallback chain.
    Qaoa(QaoaConfig),
}

impl Algorithm {
    /// Parses a name with default configuration.
    ///
    /// Case, spaces, dashes and underscores are not significant. `qaoa-<x>`
    /// selects QAOA with optimizer `x`.
    ///
    /// # Examples
    ///
    /// ```
    /// use qfleet_routing::optim::OptimizerKind;
    /// use qfleet_routing::solver::Algorithm;
    ///
    /// assert_eq!(Algorithm::from_name("NN").expect("known"), Algorithm::NearestNeighbor);
    /// assert!(matches!(
    ///     Algorithm::from_name("Branch and Bound").expect("known"),
    ///     Algorithm::BranchAndBound(_)
    /// ));
    /// match Algorithm::from_name("qaoa-L-BFGS-B").expect("known") {
    ///     Algorithm::Qaoa(config) => assert_eq!(config.optimizer, OptimizerKind::LBfgsB),
    ///     other => panic!("unexpected {other:?}"),
    /// }
    /// assert!(Algorithm::from_name("dijkstra").is_err());
    /// ```
    pub fn from_name(name: &str) -> Result<Self, VrpError> {
        let key: String = name
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();
        let algorithm = match key.as_str() {
            "nearest_neighbor" | "nn" | "greedy" => Self::NearestNeighbor,
            "genetic_algorithm" | "ga" | "genetic" => Self::Genetic(GeneticConfig::default()),
            "simulated_annealing" | "sa" | "annealing" => {
                Self::SimulatedAnnealing(AnnealingConfig::default())
            }
            "branch_and_bound" | "bb" | "bnb" | "exact" => {
                Self::BranchAndBound(BnbConfig::default())
            }
            "qaoa" => Self::Qaoa(QaoaConfig::default()),
            other => {
                let optimizer = other
                    .strip_prefix("qaoa_")
                    .and_then(|rest| OptimizerKind::from_name(rest).ok())
                    .ok_or_else(|| VrpError::UnknownAlgorithm(name.to_string()))?;
                Self::Qaoa(QaoaConfig::default().with_optimizer(optimizer))
            }
        };
        Ok(algorithm)
    }

    /// Display name, as reported in [`SolveResult::algorithm`] on success.
    pub fn name(&self) -> String {
        match self {
            Self::NearestNeighbor => NearestNeighborSolver::NAME.into(),
            Self::Genetic(_) => GeneticSolver::NAME.into(),
            Self::SimulatedAnnealing(_) => AnnealingSolver::NAME.into(),
            Self::BranchAndBound(_) => BranchAndBoundSolver::NAME.into(),
            Self::Qaoa(config) => format!("QAOA-{}", config.optimizer.name()),
        }
    }

    pub fn is_quantum(&self) -> bool {
        matches!(self, Self::Qaoa(_))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Canonical names accepted by [`Algorithm::from_name`], QAOA variants
/// included.
pub fn available_algorithms() -> Vec<String> {
    let mut names: Vec<String> = [
        "nearest_neighbor",
        "genetic_algorithm",
        "simulated_annealing",
        "branch_and_bound",
        "qaoa",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    names.extend(
        OptimizerKind::ALL
            .iter()
            .map(|k| format!("qaoa-{}", k.name().to_lowercase())),
    );
    names
}

/// Shared resources handed to every solver built from it.
#[derive(Clone, Default)]
pub struct SolverContext {
    backend: Option<Arc<dyn QuantumBackend>>,
    cache: Arc<CostModelCache>,
}

impl SolverContext {
    /// A context with a fresh cache; QAOA solvers build their own
    /// state-vector backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `backend` for every QAOA solver.
    pub fn with_backend(mut self, backend: Arc<dyn QuantumBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Uses an existing cache.
    pub fn with_cache(mut self, cache: Arc<CostModelCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &Arc<CostModelCache> {
        &self.cache
    }

    /// Builds the solver for `algorithm`.
    pub fn build_solver(&self, algorithm: &Algorithm) -> Box<dyn VrpSolver> {
        match algorithm {
            Algorithm::NearestNeighbor => Box::new(NearestNeighborSolver),
            Algorithm::Genetic(c) => Box::new(GeneticSolver::new(c.clone())),
            Algorithm::SimulatedAnnealing(c) => Box::new(AnnealingSolver::new(c.clone())),
            Algorithm::BranchAndBound(c) => Box::new(BranchAndBoundSolver::new(c.clone())),
            Algorithm::Qaoa(c) => {
                let mut solver =
                    QaoaSolver::new(c.clone()).with_cache(Arc::clone(&self.cache));
                if let Some(backend) = &self.backend {
                    solver = solver.with_backend(Arc::clone(backend));
                }
                Box::new(solver)
            }
        }
    }

    /// Builds and runs `algorithm`.
    pub fn solve(&self, problem: &Problem, algorithm: &Algorithm) -> Result<SolveResult, VrpError> {
        self.build_solver(algorithm).solve(problem)
    }
}

impl fmt::Debug for SolverContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverContext")
            .field("custom_backend", &self.backend.is_some())
            .field("cached_models", &self.cache.len())
            .finish()
    }
}

/// One entry of a [`Comparison`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmRun {
    /// Requested algorithm name.
    pub name: String,
    pub is_quantum: bool,
    pub result: Option<SolveResult>,
    pub error: Option<String>,
}

impl AlgorithmRun {
    /// Finished without error and with a valid solution.
    pub fn is_successful(&self) -> bool {
        self.result.as_ref().is_some_and(|r| r.is_valid)
    }

    fn cost(&self) -> Option<f64> {
        self.result
            .as_ref()
            .filter(|r| r.is_valid)
            .map(|r| r.total_cost)
    }
}

/// Outcome of [`compare_algorithms`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Runs in request order.
    pub runs: Vec<AlgorithmRun>,
    pub best_overall: Option<String>,
    pub best_cost: Option<f64>,
    pub best_quantum: Option<String>,
    pub best_classical: Option<String>,
    /// `(classical − quantum) / classical · 100` over the best successful run
    /// of each kind; `None` unless both kinds succeeded with a positive
    /// classical cost.
    pub quantum_advantage_percent: Option<f64>,
    pub successful: usize,
    pub quantum_successful: usize,
    pub classical_successful: usize,
}

fn best_of<'r>(runs: impl Iterator<Item = &'r AlgorithmRun>) -> Option<(&'r str, f64)> {
    runs.filter_map(|r| r.cost().map(|c| (r.name.as_str(), c)))
        .fold(None, |best, (name, cost)| match best {
            Some((_, b)) if b <= cost => best,
            _ => Some((name, cost)),
        })
}

/// Runs every algorithm on `problem` and ranks the valid results.
///
/// Failures are recorded, not propagated. Ties keep the earlier run.
///
/// # Examples
///
/// ```
/// use qfleet_routing::models::Problem;
/// use qfleet_routing::solver::{compare_algorithms, Algorithm, SolverContext};
///
/// let problem = Problem::from_points(
///     &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)], 2, 0,
/// ).expect("valid");
/// let algorithms = [
///     Algorithm::NearestNeighbor,
///     Algorithm::from_name("exact").expect("known"),
/// ];
/// let comparison = compare_algorithms(&problem, &algorithms, &SolverContext::new());
/// assert_eq!(comparison.successful, 2);
/// assert!((comparison.best_cost.expect("some") - (4.0 + 2f64.sqrt())).abs() < 1e-9);
/// assert_eq!(comparison.quantum_advantage_percent, None);
/// ```
pub fn compare_algorithms(
    problem: &Problem,
    algorithms: &[Algorithm],
    context: &SolverContext,
) -> Comparison {
    let runs: Vec<AlgorithmRun> = algorithms
        .iter()
        .map(|algorithm| {
            let name = algorithm.name();
            debug!(algorithm = %name, "running comparison entry");
            let (result, error) = match context.solve(problem, algorithm) {
                Ok(result) => (Some(result), None),
                Err(e) => {
                    warn!(algorithm = %name, error = %e, "comparison entry failed");
                    (None, Some(e.to_string()))
                }
            };
            AlgorithmRun {
                name,
                is_quantum: algorithm.is_quantum(),
                result,
                error,
            }
        })
        .collect();

    let overall = best_of(runs.iter());
    let quantum = best_of(runs.iter().filter(|r| r.is_quantum));
    let classical = best_of(runs.iter().filter(|r| !r.is_quantum));
    let quantum_advantage_percent = match (quantum, classical) {
        (Some((_, q)), Some((_, c))) if c > 0.0 => Some((c - q) / c * 100.0),
        _ => None,
    };
    let count = |quantum: Option<bool>| {
        runs.iter()
            .filter(|r| r.is_successful() && quantum.is_none_or(|q| r.is_quantum == q))
            .count()
    };

    let comparison = Comparison {
        best_overall: overall.map(|(n, _)| n.to_string()),
        best_cost: overall.map(|(_, c)| c),
        best_quantum: quantum.map(|(n, _)| n.to_string()),
        best_classical: classical.map(|(n, _)| n.to_string()),
        quantum_advantage_percent,
        successful: count(None),
        quantum_successful: count(Some(true)),
        classical_successful: count(Some(false)),
        runs,
    };
    info!(
        best = ?comparison.best_overall,
        cost = ?comparison.best_cost,
        successful = comparison.successful,
        "comparison finished"
    );
    comparison
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::instances::random_instance;
    use crate::quantum::Measurement;
    use crate::qubo::CostModel;
    use proptest::prelude::*;

    fn square() -> Problem {
        Problem::from_points(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)], 2, 0)
            .expect("valid")
    }

    struct OfflineBackend;

    impl QuantumBackend for OfflineBackend {
        fn max_qubits(&self) -> usize {
            20
        }

        fn expectation(&self, _: &CostModel, _: &[f64]) -> Result<f64, BackendError> {
            Err(BackendError::Evaluation("offline".into()))
        }

        fn sample(&self, _: &CostModel, _: &[f64], _: usize) -> Result<Vec<Measurement>, BackendError> {
            Err(BackendError::Evaluation("offline".into()))
        }
    }

    #[test]
    fn test_aliases() {
        for name in ["nearest_neighbor", "nn", "Greedy", "nearest neighbor"] {
            assert_eq!(Algorithm::from_name(name).expect(name), Algorithm::NearestNeighbor);
        }
        for name in ["genetic_algorithm", "ga", "GENETIC", "genetic-algorithm"] {
            assert!(matches!(Algorithm::from_name(name), Ok(Algorithm::Genetic(_))));
        }
        for name in ["simulated_annealing", "sa", "annealing", "Simulated Annealing"] {
            assert!(matches!(
                Algorithm::from_name(name),
                Ok(Algorithm::SimulatedAnnealing(_))
            ));
        }
        for name in ["branch_and_bound", "bb", "bnb", "exact"] {
            assert!(matches!(
                Algorithm::from_name(name),
                Ok(Algorithm::BranchAndBound(_))
            ));
        }
    }

    #[test]
    fn test_qaoa_names() {
        match Algorithm::from_name("QAOA").expect("known") {
            Algorithm::Qaoa(c) => assert_eq!(c.optimizer, OptimizerKind::Spsa),
            other => panic!("unexpected {other:?}"),
        }
        match Algorithm::from_name("qaoa_cobyla").expect("known") {
            Algorithm::Qaoa(c) => assert_eq!(c.optimizer, OptimizerKind::Cobyla),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            Algorithm::from_name("qaoa-newton"),
            Err(VrpError::UnknownAlgorithm("qaoa-newton".into()))
        );
    }

    #[test]
    fn test_available_names_parse() {
        let names = available_algorithms();
        assert_eq!(names.len(), 5 + OptimizerKind::ALL.len());
        for name in &names {
            assert!(Algorithm::from_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Algorithm::NearestNeighbor.to_string(), "Nearest Neighbor");
        assert_eq!(
            Algorithm::Qaoa(QaoaConfig::default().with_optimizer(OptimizerKind::Adam)).name(),
            "QAOA-ADAM"
        );
    }

    #[test]
    fn test_finish_flags_invalid() {
        let result = finish(
            &square(),
            vec![vec![1, 2]],
            Instant::now(),
            "partial",
            Diagnostics::NearestNeighbor { routes_used: 1 },
        );
        assert!(!result.is_valid);
        assert_eq!(result.algorithm, "partial");
    }

    #[test]
    fn test_context_shares_cache() {
        let context = SolverContext::new();
        let algorithm = Algorithm::Qaoa(QaoaConfig::default().with_max_iterations(3).with_seed(1));
        let small = Problem::from_points(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)], 1, 0)
            .expect("valid");
        context.solve(&small, &algorithm).expect("solves");
        context.solve(&small, &algorithm).expect("solves");
        assert_eq!(context.cache().len(), 1);
    }

    #[test]
    fn test_comparison_with_fallback_quantum() {
        let context = SolverContext::new().with_backend(Arc::new(OfflineBackend));
        let algorithms = [
            Algorithm::Qaoa(QaoaConfig::default().with_seed(2)),
            Algorithm::NearestNeighbor,
            Algorithm::BranchAndBound(BnbConfig::default()),
        ];
        let comparison = compare_algorithms(&square(), &algorithms, &context);
        assert_eq!(comparison.runs.len(), 3);
        assert_eq!(comparison.successful, 3);
        assert_eq!(comparison.quantum_successful, 1);
        assert_eq!(comparison.classical_successful, 2);
        assert_eq!(comparison.best_quantum.as_deref(), Some("QAOA-SPSA"));
        // The quantum entry fell back to nearest neighbor, which is optimal here.
        assert_eq!(comparison.quantum_advantage_percent, Some(0.0));
        assert_eq!(comparison.best_overall.as_deref(), Some("QAOA-SPSA"));
    }

    #[test]
    fn test_comparison_records_errors() {
        let points: Vec<(f64, f64)> = (0..7).map(|i| (i as f64, 1.0)).collect();
        let problem = Problem::from_points(&points, 2, 0).expect("valid");
        let algorithms = [Algorithm::from_name("qaoa").expect("known"), Algorithm::NearestNeighbor];
        let comparison = compare_algorithms(&problem, &algorithms, &SolverContext::new());
        assert!(comparison.runs[0].error.as_deref().is_some_and(|e| e.contains("42")));
        assert_eq!(comparison.successful, 1);
        assert_eq!(comparison.best_quantum, None);
        assert_eq!(comparison.best_classical.as_deref(), Some("Nearest Neighbor"));
        assert_eq!(comparison.quantum_advantage_percent, None);
    }

    fn assert_covers_every_customer(problem: &Problem, result: &SolveResult) {
        let depot = problem.depot();
        let report = validate(&result.solution, problem.distances(), depot);
        assert!(result.is_valid, "{} returned an invalid solution", result.algorithm);
        assert!(report.unvisited.is_empty(), "{}: unvisited {:?}", result.algorithm, report.unvisited);
        assert!(report.duplicates.is_empty(), "{}: duplicates {:?}", result.algorithm, report.duplicates);
        for route in result.solution.routes() {
            assert_eq!(route.stops().first(), Some(&depot), "{}", result.algorithm);
            assert_eq!(route.stops().last(), Some(&depot), "{}", result.algorithm);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(12))]

        #[test]
        fn prop_every_solver_visits_each_customer_once(
            n in 2usize..=7,
            vehicle_pick in 0usize..3,
            seed in any::<u64>(),
        ) {
            let vehicles = 1 + vehicle_pick % (n - 1);
            let problem = random_instance(n, vehicles, Some(seed)).problem().expect("valid");
            let context = SolverContext::new();
            let qaoa = QaoaConfig::default()
                .with_layers(1)
                .with_shots(64)
                .with_max_iterations(3)
                .with_max_qubits(12)
                .with_seed(seed);
            let algorithms = [
                Algorithm::NearestNeighbor,
                Algorithm::Genetic(
                    GeneticConfig::default()
                        .with_population_size(10)
                        .with_generations(5)
                        .with_elite_size(2)
                        .with_seed(seed),
                ),
                Algorithm::SimulatedAnnealing(
                    AnnealingConfig::default().with_max_iterations(200).with_seed(seed),
                ),
                Algorithm::BranchAndBound(BnbConfig::default()),
                Algorithm::Qaoa(qaoa),
            ];
            for algorithm in &algorithms {
                match context.solve(&problem, algorithm) {
                    Ok(result) => assert_covers_every_customer(&problem, &result),
                    Err(e) => {
                        // Only QAOA may refuse, and only for instances above 12 qubits.
                        prop_assert!(algorithm.is_quantum(), "{algorithm}: {e}");
                        prop_assert!(n > 4);
                        let is_size_error = matches!(e, VrpError::InfeasibleSize { .. });
                        prop_assert!(is_size_error);
                    }
                }
            }
        }
    }
}
