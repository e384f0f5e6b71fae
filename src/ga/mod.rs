//! Genetic algorithm for vehicle routing.
//!
//! - [`VisitOrder`] — Permutation chromosome over customer ranks
//! - [`split_even`] — Contiguous split of an order across the fleet
//! - [`VrpGaProblem`] — [`GaProblem`](u_metaheur::ga::GaProblem) implementation
//! - [`GeneticSolver`] — Runs the `u-metaheur` GA engine and reports a [`SolveResult`](crate::models::SolveResult)

mod chromosome;
mod config;
mod problem;
mod solver;
pub mod split;

pub use chromosome::VisitOrder;
pub use config::GeneticConfig;
pub use problem::VrpGaProblem;
pub use solver::GeneticSolver;
pub use split::split_even;
