//! QAOA orchestration with a tiered fallback.
//!
//! # Stages
//!
//! ```text
//! BuildQubo → Optimize → DecodePrimary → Validate → Done
//!     └──────────┴────────────┴─────────────┴──→ FallbackClassical → Done
//!                                                        └──→ EmergencyFallback → Done
//! ```
//!
//! Each stage returns `Result<_, QaoaError>`; an error moves the machine to
//! the classical fallback, whose own failure ends in singleton routes. Only
//! an oversized instance is reported to the caller as an error.

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, warn};
use u_numflow::random::create_rng;

use crate::constructive::{singleton_routes, NearestNeighborSolver};
use crate::error::{BackendError, OptimizerError, VrpError};
use crate::evaluation::validate;
use crate::models::{Diagnostics, ExecutionTier, Problem, QaoaDiagnostics, SolveResult, Solution};
use crate::optim::{Bounds, OptimizerResult};
use crate::quantum::{Bitstring, QuantumBackend, StatevectorBackend};
use crate::qubo::{build_with_factor, extract_routes, repair, CostModel, CostModelCache, VariableMap};
use crate::solver::{finish, VrpSolver};

use super::config::QaoaConfig;

/// Failure inside the quantum tier. Always recovered by the fallback chain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QaoaError {
    /// The cost model could not be built.
    #[error("QUBO construction failed: {0}")]
    Formulation(VrpError),

    /// Parameter optimization failed.
    #[error(transparent)]
    Optimizer(#[from] OptimizerError),

    /// Sampling or the canonical-best query failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// No routes could be decoded.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The repaired solution misses customers, repeats them or uses too
    /// many vehicles.
    #[error("decoded solution is infeasible: {0}")]
    Infeasible(String),
}

enum Stage {
    BuildQubo,
    Optimize(Arc<CostModel>),
    DecodePrimary(Arc<CostModel>, OptimizerResult),
    Validate(Vec<Vec<usize>>),
    FallbackClassical(QaoaError),
    EmergencyFallback(VrpError),
    Done(Vec<Vec<usize>>, ExecutionTier),
}

/// Solves a problem by QAOA, falling back to a classical solver.
///
/// # Examples
///
/// ```
/// use qfleet_routing::models::{Diagnostics, Problem};
/// use qfleet_routing::qaoa::{QaoaConfig, QaoaSolver};
/// use qfleet_routing::solver::VrpSolver;
///
/// let problem = Problem::from_points(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)], 1, 0)
///     .expect("valid");
/// let solver = QaoaSolver::new(QaoaConfig::default().with_max_iterations(10).with_seed(1));
/// let result = solver.solve(&problem).expect("solves");
/// assert!(result.is_valid);
/// assert!(result.algorithm.starts_with("QAOA-SPSA"));
/// assert!(matches!(result.diagnostics, Diagnostics::Qaoa(_)));
/// ```
pub struct QaoaSolver {
    config: QaoaConfig,
    backend: Arc<dyn QuantumBackend>,
    cache: Option<Arc<CostModelCache>>,
    fallback: Arc<dyn VrpSolver>,
}

impl QaoaSolver {
    /// Creates a solver on a [`StatevectorBackend`] with a nearest-neighbor
    /// fallback.
    pub fn new(config: QaoaConfig) -> Self {
        let mut backend = StatevectorBackend::new().with_max_qubits(config.max_qubits);
        if let Some(seed) = config.seed {
            backend = backend.with_seed(seed);
        }
        Self {
            config,
            backend: Arc::new(backend),
            cache: None,
            fallback: Arc::new(NearestNeighborSolver),
        }
    }

    /// Replaces the quantum backend.
    ///
    /// The effective qubit limit is the smaller of the backend's and
    /// [`QaoaConfig::max_qubits`].
    pub fn with_backend(mut self, backend: Arc<dyn QuantumBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Shares built cost models with other solvers.
    pub fn with_cache(mut self, cache: Arc<CostModelCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replaces the classical fallback solver.
    pub fn with_fallback(mut self, fallback: Arc<dyn VrpSolver>) -> Self {
        self.fallback = fallback;
        self
    }

    /// The configuration this solver runs with.
    pub fn config(&self) -> &QaoaConfig {
        &self.config
    }

    fn base_name(&self) -> String {
        format!("QAOA-{}", self.config.optimizer.name())
    }

    fn build_model(&self, problem: &Problem) -> Result<Arc<CostModel>, QaoaError> {
        let factor = self.config.penalty_factor;
        match &self.cache {
            Some(cache) => cache.get_or_build(problem, factor),
            None => build_with_factor(
                problem.distances(),
                problem.num_vehicles(),
                problem.depot(),
                factor,
            )
            .map(Arc::new),
        }
        .map_err(QaoaError::Formulation)
    }

    fn optimize(&self, model: &CostModel) -> Result<OptimizerResult, QaoaError> {
        let p = self.config.layers;
        let bounds: Vec<Bounds> = std::iter::repeat(Bounds::new(0.0, 2.0 * PI))
            .take(p)
            .chain(std::iter::repeat(Bounds::new(0.0, PI)).take(p))
            .collect();
        let mut rng = create_rng(self.config.seed.unwrap_or_else(rand::random::<u64>));
        let initial: Vec<f64> = bounds
            .iter()
            .map(|b| rng.random_range(b.low..b.high))
            .collect();
        debug!(layers = p, initial = ?initial, "starting angle optimization");

        let optimizer = self
            .config
            .optimizer
            .build_with(self.config.max_iterations, self.config.seed);
        let backend = &self.backend;
        let mut objective = |params: &[f64]| -> Result<f64, OptimizerError> {
            Ok(backend.expectation(model, params)?)
        };
        Ok(optimizer.optimize(&mut objective, &initial, &bounds)?)
    }

    fn decode_primary(
        &self,
        problem: &Problem,
        model: &CostModel,
        params: &[f64],
        diagnostics: &mut QaoaDiagnostics,
    ) -> Result<Vec<Vec<usize>>, QaoaError> {
        let map = VariableMap::new(problem.num_locations());
        let distances = problem.distances();
        let depot = problem.depot();

        let chosen = match self.backend.best_measurement(model, params)? {
            Some(best) => best,
            None => {
                let mut samples = self.backend.sample(model, params, self.config.shots)?;
                samples.sort_by(|a, b| {
                    b.count.cmp(&a.count).then_with(|| a.bitstring.cmp(&b.bitstring))
                });
                let top = &samples[..samples.len().min(self.config.num_candidates)];
                let feasible = top.iter().find(|m| {
                    let routes = extract_routes(m.bitstring.as_bits(), &map, distances, depot);
                    routes.len() <= problem.num_vehicles()
                        && validate(&Solution::from_sequences(depot, routes), distances, depot)
                            .is_valid
                });
                if feasible.is_none() {
                    debug!(candidates = top.len(), "no candidate decodes cleanly, using most frequent");
                }
                feasible
                    .or_else(|| samples.first())
                    .map(|m| m.bitstring.clone())
                    .ok_or_else(|| QaoaError::Decode("backend returned no measurements".into()))?
            }
        };

        diagnostics.bitstring = Some(chosen.to_string());
        let routes = self.decode(problem, &map, &chosen);
        if routes.is_empty() {
            return Err(QaoaError::Decode(format!("no routes in bitstring {chosen}")));
        }
        Ok(routes)
    }

    fn decode(&self, problem: &Problem, map: &VariableMap, bits: &Bitstring) -> Vec<Vec<usize>> {
        let extracted = extract_routes(bits.as_bits(), map, problem.distances(), problem.depot());
        repair(
            extracted,
            problem.distances(),
            problem.depot(),
            problem.num_vehicles(),
        )
    }

    fn check_feasible(&self, problem: &Problem, routes: &[Vec<usize>]) -> Result<(), QaoaError> {
        let depot = problem.depot();
        let solution = Solution::from_sequences(depot, routes.to_vec());
        let report = validate(&solution, problem.distances(), depot);
        if !report.is_valid {
            return Err(QaoaError::Infeasible(format!(
                "{} unvisited, {} duplicated",
                report.unvisited.len(),
                report.duplicates.len()
            )));
        }
        if routes.len() > problem.num_vehicles() {
            return Err(QaoaError::Infeasible(format!(
                "{} routes for {} vehicles",
                routes.len(),
                problem.num_vehicles()
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for QaoaSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QaoaSolver")
            .field("config", &self.config)
            .field("max_qubits", &self.backend.max_qubits())
            .field("cached", &self.cache.is_some())
            .field("fallback", &self.fallback.name())
            .finish()
    }
}

impl VrpSolver for QaoaSolver {
    fn name(&self) -> String {
        self.base_name()
    }

    fn solve(&self, problem: &Problem) -> Result<SolveResult, VrpError> {
        self.config.validate()?;
        let start = Instant::now();
        let d = problem.num_locations();
        let required = d * d.saturating_sub(1);
        let limit = self.config.max_qubits.min(self.backend.max_qubits());
        if required > limit {
            return Err(VrpError::InfeasibleSize { required, limit });
        }

        let mut diagnostics = QaoaDiagnostics {
            num_qubits: required,
            layers: self.config.layers,
            shots: self.config.shots,
            optimizer: self.config.optimizer.name().to_string(),
            evaluations: 0,
            best_energy: None,
            best_params: Vec::new(),
            bitstring: None,
            penalty_strength: 0.0,
            penalty_dominates: true,
            tier: ExecutionTier::Quantum,
            fallback_reason: None,
        };

        if problem.num_customers() == 0 {
            let name = self.base_name();
            return Ok(finish(problem, Vec::new(), start, &name, Diagnostics::Qaoa(diagnostics)));
        }

        debug!(qubits = required, layers = self.config.layers, "starting QAOA");
        let mut stage = Stage::BuildQubo;
        let (routes, tier) = loop {
            stage = match stage {
                Stage::BuildQubo => match self.build_model(problem) {
                    Ok(model) => {
                        diagnostics.penalty_strength = model.penalty_strength();
                        diagnostics.penalty_dominates = model.penalty_dominates();
                        Stage::Optimize(model)
                    }
                    Err(e) => Stage::FallbackClassical(e),
                },
                Stage::Optimize(model) => match self.optimize(&model) {
                    Ok(result) => {
                        diagnostics.evaluations = result.evaluations;
                        diagnostics.best_energy = Some(result.best_value);
                        diagnostics.best_params = result.best_params.clone();
                        Stage::DecodePrimary(model, result)
                    }
                    Err(e) => Stage::FallbackClassical(e),
                },
                Stage::DecodePrimary(model, result) => {
                    match self.decode_primary(problem, &model, &result.best_params, &mut diagnostics) {
                        Ok(routes) => Stage::Validate(routes),
                        Err(e) => Stage::FallbackClassical(e),
                    }
                }
                Stage::Validate(routes) => match self.check_feasible(problem, &routes) {
                    Ok(()) => Stage::Done(routes, ExecutionTier::Quantum),
                    Err(e) => Stage::FallbackClassical(e),
                },
                Stage::FallbackClassical(reason) => {
                    warn!(reason = %reason, fallback = %self.fallback.name(), "quantum tier failed, using classical fallback");
                    diagnostics.fallback_reason = Some(reason.to_string());
                    match self.fallback.solve(problem) {
                        Ok(result) => Stage::Done(
                            result.solution.sequences(problem.depot()),
                            ExecutionTier::Fallback,
                        ),
                        Err(e) => Stage::EmergencyFallback(e),
                    }
                }
                Stage::EmergencyFallback(error) => {
                    warn!(error = %error, "classical fallback failed, using singleton routes");
                    let previous = diagnostics.fallback_reason.take().unwrap_or_default();
                    diagnostics.fallback_reason =
                        Some(format!("{previous}; fallback failed: {error}"));
                    Stage::Done(singleton_routes(problem), ExecutionTier::Emergency)
                }
                Stage::Done(routes, tier) => break (routes, tier),
            };
        };

        let name = match tier {
            ExecutionTier::Quantum => self.base_name(),
            ExecutionTier::Fallback => format!("{}-Fallback", self.base_name()),
            ExecutionTier::Emergency => format!("{}-Emergency", self.base_name()),
        };
        diagnostics.tier = tier;
        let result = finish(problem, routes, start, &name, Diagnostics::Qaoa(diagnostics));
        info!(
            algorithm = %result.algorithm,
            cost = result.total_cost,
            valid = result.is_valid,
            "QAOA finished"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantum::Measurement;
    use crate::optim::OptimizerKind;

    fn triangle() -> Problem {
        Problem::from_points(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)], 1, 0).expect("valid")
    }

    fn square() -> Problem {
        Problem::from_points(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)], 2, 0)
            .expect("valid")
    }

    fn quick() -> QaoaConfig {
        QaoaConfig::default().with_max_iterations(5).with_seed(3)
    }

    fn qaoa_diagnostics(result: &SolveResult) -> &QaoaDiagnostics {
        match &result.diagnostics {
            Diagnostics::Qaoa(d) => d,
            other => panic!("unexpected diagnostics {other:?}"),
        }
    }

    /// Fails every evaluation.
    struct BrokenBackend;

    impl QuantumBackend for BrokenBackend {
        fn max_qubits(&self) -> usize {
            20
        }

        fn expectation(&self, _: &CostModel, _: &[f64]) -> Result<f64, BackendError> {
            Err(BackendError::Evaluation("device offline".into()))
        }

        fn sample(&self, _: &CostModel, _: &[f64], _: usize) -> Result<Vec<Measurement>, BackendError> {
            Err(BackendError::Evaluation("device offline".into()))
        }
    }

    /// Flat landscape with a fixed sample list.
    struct ScriptedBackend {
        samples: Vec<Measurement>,
    }

    impl QuantumBackend for ScriptedBackend {
        fn max_qubits(&self) -> usize {
            20
        }

        fn expectation(&self, _: &CostModel, params: &[f64]) -> Result<f64, BackendError> {
            Ok(params.iter().sum())
        }

        fn sample(&self, _: &CostModel, _: &[f64], _: usize) -> Result<Vec<Measurement>, BackendError> {
            Ok(self.samples.clone())
        }
    }

    struct BrokenSolver;

    impl VrpSolver for BrokenSolver {
        fn name(&self) -> String {
            "Broken".into()
        }

        fn solve(&self, _: &Problem) -> Result<SolveResult, VrpError> {
            Err(VrpError::Solver {
                algorithm: "Broken".into(),
                message: "always fails".into(),
            })
        }
    }

    #[test]
    fn test_statevector_run_is_valid() {
        let result = QaoaSolver::new(quick()).solve(&triangle()).expect("solves");
        assert!(result.is_valid);
        let diag = qaoa_diagnostics(&result);
        assert_eq!(diag.num_qubits, 6);
        assert_eq!(diag.best_params.len(), 4);
        assert!(diag.best_energy.is_some());
        assert!(diag.penalty_dominates);
    }

    #[test]
    fn test_rejects_oversized_instance() {
        let points: Vec<(f64, f64)> = (0..6).map(|i| (i as f64, 0.0)).collect();
        let problem = Problem::from_points(&points, 2, 0).expect("valid");
        let err = QaoaSolver::new(quick()).solve(&problem).unwrap_err();
        assert_eq!(err, VrpError::InfeasibleSize { required: 30, limit: 20 });
    }

    #[test]
    fn test_depot_only() {
        let problem = Problem::from_points(&[(0.0, 0.0)], 1, 0).expect("valid");
        let result = QaoaSolver::new(quick()).solve(&problem).expect("solves");
        assert!(result.is_valid);
        assert!(result.solution.is_empty());
        assert_eq!(result.total_cost, 0.0);
    }

    #[test]
    fn test_backend_failure_falls_back() {
        let solver = QaoaSolver::new(quick()).with_backend(Arc::new(BrokenBackend));
        let result = solver.solve(&square()).expect("falls back");
        assert_eq!(result.algorithm, "QAOA-SPSA-Fallback");
        assert!(result.is_valid);
        let diag = qaoa_diagnostics(&result);
        assert_eq!(diag.tier, ExecutionTier::Fallback);
        assert!(diag
            .fallback_reason
            .as_deref()
            .is_some_and(|r| r.contains("device offline")));
    }

    #[test]
    fn test_emergency_tier() {
        let solver = QaoaSolver::new(quick())
            .with_backend(Arc::new(BrokenBackend))
            .with_fallback(Arc::new(BrokenSolver));
        let result = solver.solve(&square()).expect("emergency");
        assert_eq!(result.algorithm, "QAOA-SPSA-Emergency");
        assert_eq!(result.solution.num_routes(), 3);
        assert!(result.is_valid);
        assert_eq!(qaoa_diagnostics(&result).tier, ExecutionTier::Emergency);
    }

    #[test]
    fn test_first_feasible_candidate_wins() {
        let map = VariableMap::new(3);
        let tour = Bitstring::new(map.encode(&[(0, 2), (2, 1), (1, 0)]));
        let backend = ScriptedBackend {
            samples: vec![
                Measurement {
                    bitstring: Bitstring::new(vec![false; 6]),
                    count: 10,
                },
                Measurement {
                    bitstring: tour.clone(),
                    count: 5,
                },
            ],
        };
        let solver = QaoaSolver::new(quick().with_optimizer(OptimizerKind::Cobyla))
            .with_backend(Arc::new(backend));
        let result = solver.solve(&triangle()).expect("solves");
        assert_eq!(result.algorithm, "QAOA-COBYLA");
        assert_eq!(result.solution.sequences(0), vec![vec![2, 1]]);
        assert_eq!(qaoa_diagnostics(&result).bitstring, Some(tour.to_string()));
    }

    #[test]
    fn test_candidates_ranked_by_count() {
        let map = VariableMap::new(3);
        let tour = Bitstring::new(map.encode(&[(0, 1), (1, 2), (2, 0)]));
        let backend = ScriptedBackend {
            samples: vec![
                Measurement {
                    bitstring: Bitstring::new(vec![false; 6]),
                    count: 1,
                },
                Measurement {
                    bitstring: tour.clone(),
                    count: 900,
                },
            ],
        };
        let solver =
            QaoaSolver::new(quick().with_num_candidates(1)).with_backend(Arc::new(backend));
        let result = solver.solve(&triangle()).expect("solves");
        assert_eq!(result.algorithm, "QAOA-SPSA");
        assert_eq!(result.solution.sequences(0), vec![vec![1, 2]]);
        assert_eq!(qaoa_diagnostics(&result).bitstring, Some(tour.to_string()));
    }

    #[test]
    fn test_repair_starts_from_most_frequent() {
        // Neither state decodes cleanly: all zeros has no routes and all ones
        // closes one route per customer, more than the single vehicle.
        let backend = ScriptedBackend {
            samples: vec![
                Measurement {
                    bitstring: Bitstring::new(vec![false; 6]),
                    count: 3,
                },
                Measurement {
                    bitstring: Bitstring::new(vec![true; 6]),
                    count: 700,
                },
            ],
        };
        let solver = QaoaSolver::new(quick()).with_backend(Arc::new(backend));
        let result = solver.solve(&triangle()).expect("solves");
        assert!(result.is_valid);
        assert_eq!(qaoa_diagnostics(&result).bitstring.as_deref(), Some("111111"));
    }

    #[test]
    fn test_unusable_samples_are_repaired() {
        let backend = ScriptedBackend {
            samples: vec![Measurement {
                bitstring: Bitstring::new(vec![false; 6]),
                count: 1,
            }],
        };
        let solver = QaoaSolver::new(quick()).with_backend(Arc::new(backend));
        let result = solver.solve(&triangle()).expect("solves");
        assert_eq!(result.algorithm, "QAOA-SPSA");
        assert!(result.is_valid);
        assert_eq!(result.solution.num_routes(), 1);
    }

    #[test]
    fn test_empty_sample_list_falls_back() {
        let backend = ScriptedBackend { samples: Vec::new() };
        let solver = QaoaSolver::new(quick()).with_backend(Arc::new(backend));
        let result = solver.solve(&triangle()).expect("solves");
        assert!(result.algorithm.ends_with("-Fallback"));
    }

    #[test]
    fn test_shared_cache() {
        let cache = Arc::new(CostModelCache::new());
        let solver = QaoaSolver::new(quick()).with_cache(Arc::clone(&cache));
        solver.solve(&triangle()).expect("solves");
        solver.solve(&triangle()).expect("solves");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_most_likely_backend() {
        let backend = StatevectorBackend::new().with_most_likely(true);
        let solver = QaoaSolver::new(quick()).with_backend(Arc::new(backend));
        let result = solver.solve(&triangle()).expect("solves");
        assert!(result.is_valid);
        assert_eq!(qaoa_diagnostics(&result).bitstring.as_ref().map(String::len), Some(6));
    }
}
