//! Binary quadratic formulation of the routing problem.
//!
//! - [`VariableMap`] — Directed-edge to bit index bijection
//! - [`CostModel`] — Sparse linear, quadratic and constant terms
//! - [`QuboFormulation`] — Problem reduction with degree penalties
//! - [`decode`] — Bitstring to routes with repair
//! - [`CostModelCache`] — Shared cache keyed by problem fingerprint

mod cache;
mod cost_model;
mod decoder;
mod formulation;
mod variables;

pub use cache::CostModelCache;
pub use cost_model::CostModel;
pub use decoder::{decode, extract_routes, repair};
pub use formulation::{
    build, build_with_factor, dominance_margin, penalty_strength, QuboFormulation,
    COEFFICIENT_TOLERANCE, DEFAULT_PENALTY_FACTOR,
};
pub use variables::VariableMap;
