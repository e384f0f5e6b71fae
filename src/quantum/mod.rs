//! Quantum evaluation backends for QAOA circuits.
//!
//! - [`QuantumBackend`] — Expectation and sampling interface
//! - [`StatevectorBackend`] — Exact in-process simulation
//! - [`Bitstring`] / [`Measurement`] — Sampled outcomes

mod backend;
mod bitstring;
mod statevector;

pub use backend::QuantumBackend;
pub use bitstring::{Bitstring, Measurement, ParseBitstringError};
pub use statevector::{StatevectorBackend, DEFAULT_MAX_QUBITS};
