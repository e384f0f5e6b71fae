//! Black-box parameter optimizers for variational circuits.
//!
//! - [`Spsa`] — Simultaneous perturbation stochastic approximation
//! - [`Adam`] — ADAM on finite-difference gradients
//! - [`DerivativeFree`] — Simplex, coordinate and projected L-BFGS searches
//! - [`Ensemble`] — Runs several optimizers and keeps the best
//! - [`Adaptive`] — Chooses one optimizer from the parameter count
//! - [`OptimizerKind`] — Lookup by name and construction

mod adam;
mod derivative_free;
mod ensemble;
mod kind;
mod spsa;
mod types;

pub use adam::{Adam, AdamConfig};
pub use derivative_free::{DerivativeFree, Method};
pub use ensemble::{Adaptive, Ensemble, ENSEMBLE_MEMBER_ITERATIONS};
pub use kind::{
    available_optimizers, compare_optimizers, OptimizerComparison, OptimizerKind, OptimizerRun,
    DEFAULT_MAX_ITERATIONS,
};
pub use spsa::{Spsa, SpsaConfig};
pub use types::{clip_all, prepare, Bounds, Objective, OptimizerResult, ParameterOptimizer};
