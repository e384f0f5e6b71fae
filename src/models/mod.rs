//! Domain model types for vehicle routing problems.
//!
//! A [`Problem`] ties a distance matrix to a fleet size and a depot.
//! Solvers return a [`Solution`] (routes as ordered stop sequences) wrapped
//! in a [`SolveResult`] with timing and algorithm-specific [`Diagnostics`].

mod problem;
mod result;
mod route;
mod solution;

pub use problem::Problem;
pub use result::{Diagnostics, ExecutionTier, QaoaDiagnostics, SolveResult};
pub use route::Route;
pub use solution::Solution;
