//! Solution checking.
//!
//! [`validate`] confirms the every-customer-exactly-once invariant and
//! prices each route. All solvers report validity through it.

mod validator;

pub use validator::{validate, ValidationReport};
