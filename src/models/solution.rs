//! Solution type.

use serde::{Deserialize, Serialize};

use super::Route;
use crate::distance::DistanceMatrix;

/// A set of routes, at most one per vehicle for solver output.
///
/// # Examples
///
/// ```
/// use qfleet_routing::models::Solution;
///
/// let sol = Solution::from_sequences(0, vec![vec![1, 2], vec![3]]);
/// assert_eq!(sol.num_routes(), 2);
/// assert_eq!(sol.routes()[1].stops(), &[0, 3, 0]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    routes: Vec<Route>,
}

impl Solution {
    /// Creates an empty solution.
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Builds a solution from customer sequences; empty sequences are dropped.
    pub fn from_sequences(depot: usize, sequences: Vec<Vec<usize>>) -> Self {
        let routes = sequences
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(|s| Route::from_customers(depot, &s))
            .collect();
        Self { routes }
    }

    /// Adds a route to the solution.
    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Returns all routes.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Number of routes.
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if there are no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Customer sequences with depot endpoints removed.
    pub fn sequences(&self, depot: usize) -> Vec<Vec<usize>> {
        self.routes
            .iter()
            .map(|r| r.customers(depot).to_vec())
            .collect()
    }

    /// Total distance over all routes after depot normalization.
    pub fn total_cost(&self, distances: &DistanceMatrix, depot: usize) -> f64 {
        self.routes
            .iter()
            .map(|r| r.normalized(depot).cost(distances))
            .sum()
    }
}
