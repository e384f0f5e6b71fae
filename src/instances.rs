//! Benchmark instances and instance generation.
//!
//! The named instances are small planar problems with Euclidean distances,
//! most of them sized so that the QUBO fits a state-vector simulation.
//! `demo_city` uses latitude/longitude pairs but is still priced with plain
//! Euclidean distance, so its costs are in degrees.

use rand::Rng;
use serde::{Deserialize, Serialize};
use u_numflow::random::create_rng;

use crate::error::VrpError;
use crate::models::Problem;

/// Side of the square random locations are drawn from.
pub const RANDOM_AREA_SIDE: f64 = 10.0;

/// A named set of planar locations with a fleet size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    pub description: String,
    /// Location 0 is the depot unless `depot` says otherwise.
    pub locations: Vec<(f64, f64)>,
    pub num_vehicles: usize,
    pub depot: usize,
}

impl Instance {
    fn named(name: &str, description: &str, locations: &[(f64, f64)], num_vehicles: usize) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            locations: locations.to_vec(),
            num_vehicles,
            depot: 0,
        }
    }

    /// Builds the problem with Euclidean distances.
    pub fn problem(&self) -> Result<Problem, VrpError> {
        Problem::from_points(&self.locations, self.num_vehicles, self.depot)
    }

    pub fn num_locations(&self) -> usize {
        self.locations.len()
    }

    /// Qubits the QUBO of this instance needs.
    pub fn num_qubits(&self) -> usize {
        estimate_qubits(self.num_locations())
    }
}

/// Names accepted by [`instance`].
pub const INSTANCE_NAMES: [&str; 6] = [
    "small_4_2",
    "paper_5_2",
    "medium_6_2",
    "challenge_5_3",
    "demo_city",
    "optimal_test",
];

/// Looks up a named instance.
///
/// # Examples
///
/// ```
/// use qfleet_routing::instances::instance;
///
/// let inst = instance("optimal_test").expect("known");
/// assert_eq!(inst.num_locations(), 4);
/// assert_eq!(inst.num_qubits(), 12);
/// assert!(instance("nope").is_err());
/// ```
pub fn instance(name: &str) -> Result<Instance, VrpError> {
    let inst = match name {
        "small_4_2" => Instance::named(
            name,
            "Small problem, 4 locations and 2 vehicles",
            &[(0.0, 0.0), (2.0, 3.0), (5.0, 1.0), (3.0, 4.0)],
            2,
        ),
        "paper_5_2" => Instance::named(
            name,
            "Paper example, 5 locations and 2 vehicles",
            &[(0.0, 0.0), (1.0, 2.0), (3.0, 1.0), (4.0, 3.0), (2.0, 4.0)],
            2,
        ),
        "medium_6_2" => Instance::named(
            name,
            "Medium problem, 6 locations and 2 vehicles",
            &[(0.0, 0.0), (2.0, 1.0), (4.0, 0.0), (5.0, 2.0), (3.0, 3.0), (1.0, 3.0)],
            2,
        ),
        "challenge_5_3" => Instance::named(
            name,
            "Challenge, 5 locations and 3 vehicles",
            &[(0.0, 0.0), (2.0, 2.0), (4.0, 1.0), (1.0, 4.0), (3.0, 3.0)],
            3,
        ),
        "demo_city" => Instance::named(
            name,
            "City demo on Manhattan coordinates",
            &[
                (40.7128, -74.0060),
                (40.7580, -73.9855),
                (40.7614, -73.9776),
                (40.7505, -73.9934),
                (40.7589, -73.9851),
            ],
            2,
        ),
        "optimal_test" => Instance::named(
            name,
            "Unit square with a known optimum of 4 + sqrt(2)",
            &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)],
            2,
        ),
        _ => {
            return Err(VrpError::InvalidProblem(format!(
                "unknown instance '{name}', expected one of {INSTANCE_NAMES:?}"
            )))
        }
    };
    Ok(inst)
}

/// Every named instance, in [`INSTANCE_NAMES`] order.
pub fn all_instances() -> Vec<Instance> {
    INSTANCE_NAMES
        .iter()
        .filter_map(|name| instance(name).ok())
        .collect()
}

/// Depot at the origin and `num_locations − 1` customers uniform in a
/// `10 × 10` square.
///
/// `num_locations` is raised to 1 so the depot always exists.
pub fn random_instance(num_locations: usize, num_vehicles: usize, seed: Option<u64>) -> Instance {
    let mut rng = create_rng(seed.unwrap_or_else(rand::random::<u64>));
    let mut locations = vec![(0.0, 0.0)];
    for _ in 1..num_locations.max(1) {
        locations.push((
            rng.random_range(0.0..RANDOM_AREA_SIDE),
            rng.random_range(0.0..RANDOM_AREA_SIDE),
        ));
    }
    Instance {
        name: format!("random_{num_locations}_{num_vehicles}"),
        description: format!("Random, {num_locations} locations and {num_vehicles} vehicles"),
        locations,
        num_vehicles,
        depot: 0,
    }
}

/// `D·(D−1)` edge variables.
pub fn estimate_qubits(num_locations: usize) -> usize {
    num_locations * num_locations.saturating_sub(1)
}

/// Whether a `num_locations` instance fits in `max_qubits`.
pub fn is_quantum_feasible(num_locations: usize, max_qubits: usize) -> bool {
    estimate_qubits(num_locations) <= max_qubits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructive::NearestNeighborSolver;
    use crate::exact::BranchAndBoundSolver;
    use crate::solver::VrpSolver;

    #[test]
    fn test_every_instance_builds() {
        let all = all_instances();
        assert_eq!(all.len(), INSTANCE_NAMES.len());
        for inst in &all {
            let problem = inst.problem().expect("valid");
            assert!(problem.distances().is_symmetric(1e-12));
            assert!(inst.num_vehicles < inst.num_locations());
        }
    }

    #[test]
    fn test_optimal_test_is_reached() {
        let problem = instance("optimal_test").expect("known").problem().expect("valid");
        let optimum = 4.0 + 2f64.sqrt();
        for solver in [
            Box::new(NearestNeighborSolver) as Box<dyn VrpSolver>,
            Box::new(BranchAndBoundSolver::default()),
        ] {
            let result = solver.solve(&problem).expect("solves");
            assert!(result.is_valid);
            assert!((result.total_cost - optimum).abs() < 1e-9, "{}", result.algorithm);
        }
    }

    #[test]
    fn test_quantum_feasibility() {
        assert_eq!(estimate_qubits(4), 12);
        assert_eq!(estimate_qubits(1), 0);
        assert!(is_quantum_feasible(5, 20));
        assert!(!is_quantum_feasible(6, 20));
        assert!(instance("small_4_2").expect("known").num_qubits() <= 20);
        assert!(instance("medium_6_2").expect("known").num_qubits() > 20);
    }

    #[test]
    fn test_random_instance() {
        let a = random_instance(6, 2, Some(42));
        let b = random_instance(6, 2, Some(42));
        assert_eq!(a, b);
        assert_eq!(a.locations[0], (0.0, 0.0));
        assert_eq!(a.num_locations(), 6);
        assert!(a.locations[1..]
            .iter()
            .all(|&(x, y)| (0.0..10.0).contains(&x) && (0.0..10.0).contains(&y)));
        assert!(a.problem().is_ok());
        assert_eq!(random_instance(0, 1, Some(1)).num_locations(), 1);
    }
}
