//! Solution validation and cost reporting.

use serde::{Deserialize, Serialize};

use crate::distance::DistanceMatrix;
use crate::models::{Route, Solution};

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// No customer missing, none repeated, no unknown stop.
    pub is_valid: bool,
    /// Sum of `route_costs`.
    pub total_cost: f64,
    /// Cost of each route after depot normalization.
    pub route_costs: Vec<f64>,
    /// Number of routes, empty ones included.
    pub num_routes: usize,
    /// Customers never visited, ascending.
    pub unvisited: Vec<usize>,
    /// Customers visited more than once, ascending, each listed once.
    pub duplicates: Vec<usize>,
    /// Stops that are not a location of the matrix.
    pub unknown_stops: Vec<usize>,
    /// `total_cost / num_routes`, or `0.0` without routes.
    pub average_route_cost: f64,
}

/// Checks that every customer is visited exactly once and prices the routes.
///
/// Each route is normalized to start and end at `depot` before its cost is
/// computed, so callers may pass routes with or without depot endpoints.
/// Intermediate depot stops are tolerated and priced as ordinary legs.
/// The check is pure: validating the same input twice gives equal reports.
///
/// # Examples
///
/// ```
/// use qfleet_routing::distance::DistanceMatrix;
/// use qfleet_routing::evaluation::validate;
/// use qfleet_routing::models::Solution;
///
/// let dm = DistanceMatrix::from_points(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
/// let sol = Solution::from_sequences(0, vec![vec![1], vec![2]]);
/// let report = validate(&sol, &dm, 0);
/// assert!(report.is_valid);
/// assert!((report.total_cost - 4.0).abs() < 1e-10);
///
/// let partial = Solution::from_sequences(0, vec![vec![1, 1]]);
/// let report = validate(&partial, &dm, 0);
/// assert!(!report.is_valid);
/// assert_eq!(report.unvisited, vec![2]);
/// assert_eq!(report.duplicates, vec![1]);
/// ```
pub fn validate(solution: &Solution, distances: &DistanceMatrix, depot: usize) -> ValidationReport {
    let n = distances.size();
    let mut visits = vec![0usize; n];
    let mut unknown_stops = Vec::new();
    let mut route_costs = Vec::with_capacity(solution.num_routes());

    for route in solution.routes() {
        let normalized = route.normalized(depot);
        let known: Vec<usize> = normalized
            .stops()
            .iter()
            .copied()
            .filter(|&s| {
                if s < n {
                    true
                } else {
                    unknown_stops.push(s);
                    false
                }
            })
            .collect();
        for &c in normalized.customers(depot) {
            if c < n && c != depot {
                visits[c] += 1;
            }
        }
        route_costs.push(Route::new(known).cost(distances));
    }

    let mut unvisited = Vec::new();
    let mut duplicates = Vec::new();
    for (c, &count) in visits.iter().enumerate() {
        if c == depot {
            continue;
        }
        match count {
            0 => unvisited.push(c),
            1 => {}
            _ => duplicates.push(c),
        }
    }
    unknown_stops.sort_unstable();
    unknown_stops.dedup();

    let total_cost: f64 = route_costs.iter().sum();
    let num_routes = route_costs.len();
    let average_route_cost = if num_routes == 0 {
        0.0
    } else {
        total_cost / num_routes as f64
    };

    ValidationReport {
        is_valid: unvisited.is_empty() && duplicates.is_empty() && unknown_stops.is_empty(),
        total_cost,
        route_costs,
        num_routes,
        unvisited,
        duplicates,
        unknown_stops,
        average_route_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn square() -> DistanceMatrix {
        DistanceMatrix::from_points(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)])
    }

    #[test]
    fn test_valid_solution() {
        let dm = square();
        let sol = Solution::from_sequences(0, vec![vec![1], vec![2, 3]]);
        let r = validate(&sol, &dm, 0);
        assert!(r.is_valid);
        assert_eq!(r.num_routes, 2);
        assert!((r.route_costs[0] - 2.0).abs() < 1e-10);
        assert!((r.route_costs[1] - (2.0 + 2f64.sqrt())).abs() < 1e-10);
        assert!((r.average_route_cost - r.total_cost / 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_routes_without_depot_are_normalized() {
        let dm = square();
        let with = Solution::from_sequences(0, vec![vec![1, 3, 2]]);
        let mut without = Solution::new();
        without.add_route(Route::new(vec![1, 3, 2]));
        let a = validate(&with, &dm, 0);
        let b = validate(&without, &dm, 0);
        assert!((a.total_cost - b.total_cost).abs() < 1e-10);
        assert!(b.is_valid);
    }

    #[test]
    fn test_missing_and_duplicate() {
        let dm = square();
        let sol = Solution::from_sequences(0, vec![vec![1, 2], vec![2]]);
        let r = validate(&sol, &dm, 0);
        assert!(!r.is_valid);
        assert_eq!(r.unvisited, vec![3]);
        assert_eq!(r.duplicates, vec![2]);
    }

    #[test]
    fn test_unknown_stop_invalid() {
        let dm = square();
        let sol = Solution::from_sequences(0, vec![vec![1, 2, 3, 9]]);
        let r = validate(&sol, &dm, 0);
        assert!(!r.is_valid);
        assert_eq!(r.unknown_stops, vec![9]);
    }

    #[test]
    fn test_empty_solution() {
        let dm = square();
        let r = validate(&Solution::new(), &dm, 0);
        assert!(!r.is_valid);
        assert_eq!(r.unvisited, vec![1, 2, 3]);
        assert_eq!(r.average_route_cost, 0.0);
    }

    #[test]
    fn test_depot_only_problem() {
        let dm = DistanceMatrix::new(1);
        let r = validate(&Solution::new(), &dm, 0);
        assert!(r.is_valid);
        assert_eq!(r.total_cost, 0.0);
    }

    #[test]
    fn test_non_zero_depot() {
        let dm = square();
        let sol = Solution::from_sequences(3, vec![vec![0, 1, 2]]);
        let r = validate(&sol, &dm, 3);
        assert!(r.is_valid);
    }

    proptest! {
        #[test]
        fn prop_validation_is_idempotent(
            routes in proptest::collection::vec(proptest::collection::vec(0usize..4, 0..5), 0..4)
        ) {
            let dm = square();
            let mut sol = Solution::new();
            for r in routes {
                sol.add_route(Route::new(r));
            }
            let first = validate(&sol, &dm, 0);
            let second = validate(&sol, &dm, 0);
            prop_assert_eq!(&first, &second);

            let normalized = Solution::from_sequences(0, sol.sequences(0));
            let again = validate(&normalized, &dm, 0);
            prop_assert_eq!(first.is_valid, again.is_valid);
        }
    }
}
