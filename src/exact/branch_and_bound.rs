//! Depth-first branch and bound for tiny instances.
//!
//! # Algorithm
//!
//! The search tree assigns customers one at a time. At each node the open
//! route is either extended with an unused customer or closed so the next
//! route can start. Leaves are complete solutions with exactly
//! `k = min(V, n)` non-empty routes, so every (permutation, split) pair is
//! reachable. A branch is cut once its partial distance reaches the
//! incumbent; distances are non-negative, so the partial cost is a valid
//! lower bound.
//!
//! The wall-clock deadline is polled at every node expansion. Instances with
//! more than [`MAX_EXACT_CUSTOMERS`] customers are delegated to the
//! nearest-neighbor heuristic.
//!
//! # Complexity
//!
//! O(n! · C(n-1, k-1)) leaves in the worst case.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constructive::nearest_neighbor;
use crate::distance::DistanceMatrix;
use crate::error::VrpError;
use crate::models::{Diagnostics, Problem, SolveResult};
use crate::solver::{finish, VrpSolver};

/// Largest customer count searched exhaustively.
pub const MAX_EXACT_CUSTOMERS: usize = 6;

/// Configuration for [`BranchAndBoundSolver`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BnbConfig {
    /// Wall-clock budget in seconds.
    pub time_budget: f64,
}

impl Default for BnbConfig {
    fn default() -> Self {
        Self { time_budget: 30.0 }
    }
}

impl BnbConfig {
    /// Sets the time budget in seconds.
    pub fn with_time_budget(mut self, secs: f64) -> Self {
        self.time_budget = secs;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), VrpError> {
        if !(self.time_budget.is_finite() && self.time_budget > 0.0) {
            return Err(VrpError::InvalidConfig(
                "time_budget must be a positive number of seconds".into(),
            ));
        }
        Ok(())
    }
}

/// Result of an exhaustive search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Best customer sequences, `None` if the deadline fired before any leaf.
    pub routes: Option<Vec<Vec<usize>>>,
    /// Cost of `routes`, infinite when none.
    pub cost: f64,
    /// Nodes expanded.
    pub nodes: u64,
    /// Whether the deadline cut the search short.
    pub timed_out: bool,
}

struct Search<'a> {
    distances: &'a DistanceMatrix,
    depot: usize,
    customers: Vec<usize>,
    num_routes: usize,
    deadline: Instant,
    used: Vec<bool>,
    routes: Vec<Vec<usize>>,
    best_cost: f64,
    best_routes: Option<Vec<Vec<usize>>>,
    nodes: u64,
    timed_out: bool,
}

impl Search<'_> {
    fn expand(&mut self, cost: f64, placed: usize) {
        if self.timed_out {
            return;
        }
        self.nodes += 1;
        if Instant::now() >= self.deadline {
            self.timed_out = true;
            return;
        }
        if cost >= self.best_cost {
            return;
        }

        let n = self.customers.len();
        let last = self
            .routes
            .last()
            .and_then(|r| r.last())
            .copied()
            .unwrap_or(self.depot);

        if placed == n {
            if self.routes.len() == self.num_routes {
                let total = cost + self.distances.get(last, self.depot);
                if total < self.best_cost {
                    self.best_cost = total;
                    self.best_routes = Some(self.routes.clone());
                }
            }
            return;
        }

        let routes_to_open = self.num_routes - self.routes.len();

        // Extend the open route.
        if n - placed - 1 >= routes_to_open {
            for idx in 0..n {
                if self.used[idx] {
                    continue;
                }
                let c = self.customers[idx];
                self.used[idx] = true;
                if let Some(route) = self.routes.last_mut() {
                    route.push(c);
                }
                self.expand(cost + self.distances.get(last, c), placed + 1);
                if let Some(route) = self.routes.last_mut() {
                    route.pop();
                }
                self.used[idx] = false;
                if self.timed_out {
                    return;
                }
            }
        }

        // Close it and open the next one.
        let open_is_empty = self.routes.last().is_none_or(|r| r.is_empty());
        if !open_is_empty && routes_to_open > 0 {
            self.routes.push(Vec::new());
            self.expand(cost + self.distances.get(last, self.depot), placed);
            self.routes.pop();
        }
    }
}

/// Exhaustively searches all splits of all customer orders into exactly
/// `min(V, n)` non-empty routes.
pub fn exhaustive_search(problem: &Problem, deadline: Instant) -> SearchOutcome {
    let customers = problem.customers();
    let n = customers.len();
    if n == 0 {
        return SearchOutcome {
            routes: Some(Vec::new()),
            cost: 0.0,
            nodes: 0,
            timed_out: false,
        };
    }

    let mut search = Search {
        distances: problem.distances(),
        depot: problem.depot(),
        num_routes: problem.num_vehicles().min(n),
        customers,
        deadline,
        used: vec![false; n],
        routes: vec![Vec::new()],
        best_cost: f64::INFINITY,
        best_routes: None,
        nodes: 0,
        timed_out: false,
    };
    search.expand(0.0, 0);

    SearchOutcome {
        routes: search.best_routes,
        cost: search.best_cost,
        nodes: search.nodes,
        timed_out: search.timed_out,
    }
}

/// Exact solver for instances with at most [`MAX_EXACT_CUSTOMERS`] customers.
///
/// # Examples
///
/// ```
/// use qfleet_routing::exact::BranchAndBoundSolver;
/// use qfleet_routing::models::Problem;
/// use qfleet_routing::solver::VrpSolver;
///
/// let problem = Problem::from_points(
///     &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)], 2, 0,
/// ).expect("valid");
/// let result = BranchAndBoundSolver::default().solve(&problem).expect("solves");
/// assert!((result.total_cost - (4.0 + 2f64.sqrt())).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BranchAndBoundSolver {
    config: BnbConfig,
}

impl BranchAndBoundSolver {
    /// Display name.
    pub const NAME: &'static str = "Branch and Bound";

    /// Creates a solver with the given configuration.
    pub fn new(config: BnbConfig) -> Self {
        Self { config }
    }
}

impl VrpSolver for BranchAndBoundSolver {
    fn name(&self) -> String {
        Self::NAME.to_string()
    }

    fn solve(&self, problem: &Problem) -> Result<SolveResult, VrpError> {
        self.config.validate()?;
        let start = Instant::now();
        let n = problem.num_customers();

        if n > MAX_EXACT_CUSTOMERS {
            debug!(customers = n, "too many customers for exhaustive search, using nearest neighbor");
            let diagnostics = Diagnostics::BranchAndBound {
                is_optimal: false,
                timed_out: false,
                nodes_explored: 0,
            };
            return Ok(finish(
                problem,
                nearest_neighbor(problem),
                start,
                Self::NAME,
                diagnostics,
            ));
        }

        let deadline = start + Duration::from_secs_f64(self.config.time_budget);
        let outcome = exhaustive_search(problem, deadline);
        if outcome.timed_out {
            warn!(nodes = outcome.nodes, "branch and bound hit its time budget");
        }
        let routes = match outcome.routes {
            Some(routes) => routes,
            None => nearest_neighbor(problem),
        };

        let diagnostics = Diagnostics::BranchAndBound {
            is_optimal: true,
            timed_out: outcome.timed_out,
            nodes_explored: outcome.nodes,
        };
        Ok(finish(problem, routes, start, Self::NAME, diagnostics))
    }
}
