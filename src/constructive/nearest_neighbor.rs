//! Nearest-neighbor constructive heuristic.
//!
//! Builds one route per vehicle: starting from the depot, always visit the
//! nearest unassigned customer until the vehicle's share of the remaining
//! customers is reached, then return to the depot.
//!
//! # Algorithm
//!
//! Vehicle `v` (0-based) of `V` takes `max(1, remaining / (V - v))`
//! customers, so the load is spread evenly across the fleet. Customers left
//! over after every vehicle has been used go to extra routes of at most
//! [`OVERFLOW_ROUTE_LEN`] customers each.
//!
//! # Complexity
//!
//! O(n²) where n = number of customers.

use std::time::Instant;

use tracing::debug;

use crate::distance::DistanceMatrix;
use crate::error::VrpError;
use crate::models::{Diagnostics, Problem, SolveResult};
use crate::solver::{finish, VrpSolver};

/// Maximum customers on an overflow route.
pub const OVERFLOW_ROUTE_LEN: usize = 3;

/// Constructs customer sequences using the nearest-neighbor heuristic.
///
/// Ties go to the lowest customer index. Every customer appears exactly once
/// in the output.
///
/// # Examples
///
/// ```
/// use qfleet_routing::models::Problem;
/// use qfleet_routing::constructive::nearest_neighbor;
///
/// let problem = Problem::from_points(
///     &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)], 2, 0,
/// ).expect("valid");
/// let routes = nearest_neighbor(&problem);
/// assert_eq!(routes, vec![vec![1], vec![2, 3]]);
/// ```
pub fn nearest_neighbor(problem: &Problem) -> Vec<Vec<usize>> {
    let distances = problem.distances();
    let depot = problem.depot();
    let num_vehicles = problem.num_vehicles();
    let mut remaining = problem.customers();
    let mut routes = Vec::new();

    for vehicle in 0..num_vehicles {
        if remaining.is_empty() {
            break;
        }
        let target = (remaining.len() / (num_vehicles - vehicle)).max(1);
        routes.push(greedy_path(&mut remaining, depot, target, distances));
    }

    while !remaining.is_empty() {
        routes.push(greedy_path(&mut remaining, depot, OVERFLOW_ROUTE_LEN, distances));
    }

    routes
}

/// Pulls up to `count` customers out of `remaining`, nearest first.
fn greedy_path(
    remaining: &mut Vec<usize>,
    depot: usize,
    count: usize,
    distances: &DistanceMatrix,
) -> Vec<usize> {
    let mut route = Vec::with_capacity(count);
    let mut current = depot;
    for _ in 0..count {
        let Some(next) = distances.nearest_neighbor(current, remaining) else {
            break;
        };
        remaining.retain(|&c| c != next);
        route.push(next);
        current = next;
    }
    route
}

/// One customer per route. Always valid, never good.
///
/// Used as the last-resort construction when every other tier has failed.
pub fn singleton_routes(problem: &Problem) -> Vec<Vec<usize>> {
    problem.customers().into_iter().map(|c| vec![c]).collect()
}

/// [`VrpSolver`] wrapper around [`nearest_neighbor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighborSolver;

impl NearestNeighborSolver {
    /// Display name.
    pub const NAME: &'static str = "Nearest Neighbor";
}

impl VrpSolver for NearestNeighborSolver {
    fn name(&self) -> String {
        Self::NAME.to_string()
    }

    fn solve(&self, problem: &Problem) -> Result<SolveResult, VrpError> {
        let start = Instant::now();
        let routes = nearest_neighbor(problem);
        debug!(routes = routes.len(), "nearest neighbor constructed");
        let diagnostics = Diagnostics::NearestNeighbor {
            routes_used: routes.len(),
        };
        Ok(finish(problem, routes, start, Self::NAME, diagnostics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_problem(vehicles: usize) -> Problem {
        Problem::from_points(
            &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)],
            vehicles,
            0,
        )
        .expect("valid")
    }

    #[test]
    fn test_nn_all_on_one_route() {
        let routes = nearest_neighbor(&line_problem(1));
        assert_eq!(routes, vec![vec![1, 2, 3]]);
    }

    #[test]
    fn test_nn_splits_evenly() {
        // 3 customers, 2 vehicles: first takes 3 / 2 = 1, second takes 2
        let routes = nearest_neighbor(&line_problem(2));
        assert_eq!(routes, vec![vec![1], vec![2, 3]]);
    }

    #[test]
    fn test_nn_more_vehicles_than_customers() {
        let routes = nearest_neighbor(&line_problem(5));
        assert_eq!(routes.len(), 3);
        assert!(routes.iter().all(|r| r.len() == 1));
    }

    #[test]
    fn test_nn_depot_only() {
        let problem = Problem::new(DistanceMatrix::new(1), 2, 0).expect("valid");
        assert!(nearest_neighbor(&problem).is_empty());
    }

    #[test]
    fn test_nn_chooses_nearest() {
        let problem =
            Problem::from_points(&[(0.0, 0.0), (10.0, 0.0), (1.0, 0.0)], 1, 0).expect("valid");
        assert_eq!(nearest_neighbor(&problem), vec![vec![2, 1]]);
    }

    #[test]
    fn test_nn_non_zero_depot() {
        let problem =
            Problem::from_points(&[(1.0, 0.0), (0.0, 0.0), (2.0, 0.0)], 1, 1).expect("valid");
        assert_eq!(nearest_neighbor(&problem), vec![vec![0, 2]]);
    }

    #[test]
    fn test_singleton_routes() {
        let routes = singleton_routes(&line_problem(1));
        assert_eq!(routes, vec![vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn test_solver_reports_valid() {
        let result = NearestNeighborSolver.solve(&line_problem(2)).expect("solves");
        assert!(result.is_valid);
        assert_eq!(result.algorithm, "Nearest Neighbor");
        // [0,1,0] = 2, [0,2,3,0] = 2 + 1 + 3 = 6
        assert!((result.total_cost - 8.0).abs() < 1e-10);
    }
}
