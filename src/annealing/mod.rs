//! Simulated annealing for vehicle routing.
//!
//! - [`AnnealingConfig`] — Temperature schedule and budget
//! - [`Move`] — Swap, relocate and 2-opt neighborhood moves
//! - [`AnnealingSolver`] — Metropolis search started from nearest neighbor

mod config;
mod moves;
mod solver;

pub use config::AnnealingConfig;
pub use moves::{random_neighbor, Move};
pub use solver::{AnnealingOutcome, AnnealingSolver};
