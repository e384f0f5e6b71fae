//! Quantum evaluation primitive.

use crate::error::BackendError;
use crate::qubo::CostModel;

use super::bitstring::{Bitstring, Measurement};

/// Evaluates a QAOA circuit for a cost model.
///
/// `params` is laid out as `[γ1..γp, β1..βp]`. Implementations must be
/// shareable across threads; a solver holds one behind an `Arc`.
pub trait QuantumBackend: Send + Sync {
    /// Largest model this backend accepts.
    fn max_qubits(&self) -> usize;

    /// `⟨ψ(params)| C |ψ(params)⟩`.
    fn expectation(&self, model: &CostModel, params: &[f64]) -> Result<f64, BackendError>;

    /// Draws `shots` measurements, grouped by outcome and sorted by
    /// descending count.
    fn sample(
        &self,
        model: &CostModel,
        params: &[f64],
        shots: usize,
    ) -> Result<Vec<Measurement>, BackendError>;

    /// A canonical best outcome, for backends that can report one.
    fn best_measurement(
        &self,
        _model: &CostModel,
        _params: &[f64],
    ) -> Result<Option<Bitstring>, BackendError> {
        Ok(None)
    }
}
