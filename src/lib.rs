//! # qfleet-routing
//!
//! Vehicle routing on small fleets: a QUBO formulation of the VRP, a QAOA
//! pipeline that always produces routes through a tiered classical fallback,
//! and the classical baselines it is measured against.
//!
//! ## Modules
//!
//! - [`models`] — Problem, routes, solutions and solver results
//! - [`distance`] — Distance matrix with Euclidean and haversine builders
//! - [`evaluation`] — Solution validation and cost reporting
//! - [`constructive`] — Nearest-neighbor construction and singleton routes
//! - [`local_search`] — Cheapest insertion and 2-opt
//! - [`ga`] — Genetic algorithm on the `u-metaheur` engine
//! - [`annealing`] — Simulated annealing
//! - [`exact`] — Branch and bound for tiny instances
//! - [`qubo`] — QUBO formulation, decoding and repair
//! - [`optim`] — Parameter optimizers (SPSA, ADAM, derivative-free, ensembles)
//! - [`quantum`] — Quantum evaluation backends
//! - [`qaoa`] — QAOA orchestration with fallback
//! - [`solver`] — Solver trait, factory by name and comparison
//! - [`instances`] — Benchmark instances and random generation
//! - [`error`] — Error types
//!
//! ## Example
//!
//! ```
//! use qfleet_routing::instances::instance;
//! use qfleet_routing::solver::{compare_algorithms, Algorithm, SolverContext};
//!
//! let problem = instance("small_4_2").expect("known").problem().expect("valid");
//! let algorithms = [
//!     Algorithm::from_name("nn").expect("known"),
//!     Algorithm::from_name("bnb").expect("known"),
//! ];
//! let comparison = compare_algorithms(&problem, &algorithms, &SolverContext::new());
//! assert_eq!(comparison.successful, 2);
//! ```

pub mod annealing;
pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod exact;
pub mod ga;
pub mod instances;
pub mod local_search;
pub mod models;
pub mod optim;
pub mod qaoa;
pub mod quantum;
pub mod qubo;
pub mod solver;
