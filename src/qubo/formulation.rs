//! VRP to QUBO reduction.
//!
//! # Algorithm
//!
//! One bit per directed edge. The objective adds `d[i][j]` to the linear
//! weight of bit `(i, j)`. Each degree constraint `Σ x = t` adds the penalty
//! `P·(Σ x − t)²`, expanded with `x² = x`:
//!
//! ```text
//! linear    += P·(1 − 2t)   per participating bit
//! quadratic += 2P           per unordered pair of participating bits
//! constant  += P·t²
//! ```
//!
//! Constraints: out-degree 1 and in-degree 1 for every customer, out-degree
//! `V` for the depot.
//!
//! # Penalty strength
//!
//! `P = max(max_distance, 1) · D · penalty_factor` (the `1` applies only to
//! an all-zero matrix). A degree-feasible assignment has `D − 1 + V` edges,
//! so its objective is at most `(D − 1 + V)·max_distance`; any violation
//! costs at least `P`. The model records whether `P` exceeds that margin.

use tracing::{debug, warn};

use crate::distance::DistanceMatrix;
use crate::error::VrpError;
use crate::models::Problem;

use super::cost_model::CostModel;
use super::variables::VariableMap;

/// Coefficients with smaller magnitude are dropped.
pub const COEFFICIENT_TOLERANCE: f64 = 1e-10;

/// Default multiplier in the penalty strength.
pub const DEFAULT_PENALTY_FACTOR: f64 = 2.0;

/// `max(max_distance, 1 if all zero) · D · penalty_factor`.
pub fn penalty_strength(distances: &DistanceMatrix, penalty_factor: f64) -> f64 {
    let max_d = distances.max_distance();
    let scale = if max_d > 0.0 { max_d } else { 1.0 };
    scale * distances.size() as f64 * penalty_factor
}

/// Largest objective a degree-feasible assignment can reach.
pub fn dominance_margin(distances: &DistanceMatrix, num_vehicles: usize) -> f64 {
    let d = distances.size();
    (d.saturating_sub(1) + num_vehicles) as f64 * distances.max_distance()
}

fn add_exactly(model: &mut CostModel, bits: &[usize], target: f64, penalty: f64) {
    for &b in bits {
        model.add_linear(b, penalty * (1.0 - 2.0 * target));
    }
    for (k, &a) in bits.iter().enumerate() {
        for &b in &bits[k + 1..] {
            model.add_quadratic(a, b, 2.0 * penalty);
        }
    }
    model.add_constant(penalty * target * target);
}

/// Builds the cost model with the default penalty factor.
///
/// # Errors
///
/// Returns [`VrpError::InvalidProblem`] when `depot` is out of range or
/// `num_vehicles` is zero.
///
/// # Examples
///
/// ```
/// use qfleet_routing::distance::DistanceMatrix;
/// use qfleet_routing::qubo::{build, VariableMap};
///
/// let dm = DistanceMatrix::from_points(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
/// let model = build(&dm, 1, 0).expect("valid");
/// let map = VariableMap::new(3);
///
/// // The tour 0 → 1 → 2 → 0 satisfies every degree constraint.
/// let tour = map.encode(&[(0, 1), (1, 2), (2, 0)]);
/// let cost = 1.0 + 2f64.sqrt() + 1.0;
/// assert!((model.energy(&tour) - cost).abs() < 1e-9);
/// ```
pub fn build(
    distances: &DistanceMatrix,
    num_vehicles: usize,
    depot: usize,
) -> Result<CostModel, VrpError> {
    build_with_factor(distances, num_vehicles, depot, DEFAULT_PENALTY_FACTOR)
}

/// Builds the cost model with an explicit penalty factor.
pub fn build_with_factor(
    distances: &DistanceMatrix,
    num_vehicles: usize,
    depot: usize,
    penalty_factor: f64,
) -> Result<CostModel, VrpError> {
    let d = distances.size();
    if depot >= d {
        return Err(VrpError::InvalidProblem(format!(
            "depot index {depot} out of range for {d} locations"
        )));
    }
    if num_vehicles == 0 {
        return Err(VrpError::InvalidProblem("at least one vehicle is required".into()));
    }
    if !(penalty_factor.is_finite() && penalty_factor > 0.0) {
        return Err(VrpError::InvalidConfig("penalty_factor must be positive".into()));
    }

    let map = VariableMap::new(d);
    let penalty = penalty_strength(distances, penalty_factor);
    let mut model = CostModel::zero(map.num_bits());

    for bit in 0..map.num_bits() {
        if let Some((i, j)) = map.edge(bit) {
            model.add_linear(bit, distances.get(i, j));
        }
    }
    for c in (0..d).filter(|&c| c != depot) {
        add_exactly(&mut model, &map.outgoing(c), 1.0, penalty);
        add_exactly(&mut model, &map.incoming(c), 1.0, penalty);
    }
    add_exactly(&mut model, &map.outgoing(depot), num_vehicles as f64, penalty);

    model.prune(COEFFICIENT_TOLERANCE);
    if model.is_empty() {
        debug!(locations = d, "no QUBO terms, using zero model");
        model = CostModel::zero(map.num_bits());
    }

    let margin = dominance_margin(distances, num_vehicles);
    let dominates = penalty > margin;
    if !dominates {
        warn!(
            penalty,
            margin, "penalty strength does not dominate the objective; decoded solutions may violate constraints"
        );
    }
    model.set_penalty(penalty, dominates);
    debug!(
        qubits = map.num_bits(),
        terms = model.num_terms(),
        penalty,
        "built QUBO"
    );
    Ok(model)
}

/// A problem together with its variable map and cost model.
#[derive(Debug, Clone)]
pub struct QuboFormulation {
    variables: VariableMap,
    cost_model: CostModel,
}

impl QuboFormulation {
    /// Formulates `problem` with the default penalty factor.
    pub fn new(problem: &Problem) -> Result<Self, VrpError> {
        Self::with_penalty_factor(problem, DEFAULT_PENALTY_FACTOR)
    }

    /// Formulates `problem` with an explicit penalty factor.
    pub fn with_penalty_factor(problem: &Problem, penalty_factor: f64) -> Result<Self, VrpError> {
        let cost_model = build_with_factor(
            problem.distances(),
            problem.num_vehicles(),
            problem.depot(),
            penalty_factor,
        )?;
        Ok(Self {
            variables: VariableMap::new(problem.num_locations()),
            cost_model,
        })
    }

    /// The variable map.
    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }

    /// The cost model.
    pub fn cost_model(&self) -> &CostModel {
        &self.cost_model
    }

    /// Number of qubits, `D·(D−1)`.
    pub fn num_qubits(&self) -> usize {
        self.variables.num_bits()
    }
}
