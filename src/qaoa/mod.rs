//! QAOA orchestration.
//!
//! - [`QaoaConfig`] — Circuit depth, shots, optimizer and limits
//! - [`QaoaSolver`] — Optimize, decode and validate, with classical and
//!   emergency fallbacks

mod config;
mod solver;

pub use config::QaoaConfig;
pub use solver::{QaoaError, QaoaSolver};
