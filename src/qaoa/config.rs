//! QAOA orchestrator configuration.

use serde::{Deserialize, Serialize};

use crate::error::VrpError;
use crate::optim::OptimizerKind;
use crate::quantum::DEFAULT_MAX_QUBITS;
use crate::qubo::DEFAULT_PENALTY_FACTOR;

/// Configuration for [`QaoaSolver`](super::QaoaSolver).
///
/// # Examples
///
/// ```
/// use qfleet_routing::optim::OptimizerKind;
/// use qfleet_routing::qaoa::QaoaConfig;
///
/// let config = QaoaConfig::default()
///     .with_layers(1)
///     .with_optimizer(OptimizerKind::Cobyla)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.shots, 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaoaConfig {
    /// Circuit depth `p`; the optimizer tunes `2p` angles.
    pub layers: usize,
    /// Shots per sampling call.
    pub shots: usize,
    /// Iteration budget passed to the optimizer.
    pub max_iterations: usize,
    /// Classical optimizer for the angles.
    pub optimizer: OptimizerKind,
    /// Most frequent outcomes tried before settling for the top one.
    pub num_candidates: usize,
    /// Instances needing more qubits are rejected up front.
    pub max_qubits: usize,
    /// Multiplier in the QUBO penalty strength.
    pub penalty_factor: f64,
    /// Seeds the initial angles, the optimizer and the default backend.
    pub seed: Option<u64>,
}

impl Default for QaoaConfig {
    fn default() -> Self {
        Self {
            layers: 2,
            shots: 1024,
            max_iterations: 100,
            optimizer: OptimizerKind::Spsa,
            num_candidates: 8,
            max_qubits: DEFAULT_MAX_QUBITS,
            penalty_factor: DEFAULT_PENALTY_FACTOR,
            seed: None,
        }
    }
}

impl QaoaConfig {
    /// Sets the circuit depth `p`.
    pub fn with_layers(mut self, layers: usize) -> Self {
        self.layers = layers;
        self
    }

    /// Sets the shots per sampling call.
    pub fn with_shots(mut self, shots: usize) -> Self {
        self.shots = shots;
        self
    }

    /// Sets the optimizer iteration budget.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Selects the angle optimizer.
    pub fn with_optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Sets how many of the most frequent outcomes are tried.
    pub fn with_num_candidates(mut self, n: usize) -> Self {
        self.num_candidates = n;
        self
    }

    /// Sets the qubit ceiling checked before solving.
    pub fn with_max_qubits(mut self, n: usize) -> Self {
        self.max_qubits = n;
        self
    }

    /// Sets the QUBO penalty multiplier.
    pub fn with_penalty_factor(mut self, factor: f64) -> Self {
        self.penalty_factor = factor;
        self
    }

    /// Seeds every random choice of the run.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), VrpError> {
        if self.layers == 0 {
            return Err(VrpError::InvalidConfig("layers must be at least 1".into()));
        }
        if self.shots == 0 {
            return Err(VrpError::InvalidConfig("shots must be positive".into()));
        }
        if self.num_candidates == 0 {
            return Err(VrpError::InvalidConfig(
                "num_candidates must be positive".into(),
            ));
        }
        if !(self.penalty_factor.is_finite() && self.penalty_factor > 0.0) {
            return Err(VrpError::InvalidConfig(
                "penalty_factor must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = QaoaConfig::default();
        assert_eq!(c.layers, 2);
        assert_eq!(c.max_iterations, 100);
        assert_eq!(c.optimizer, OptimizerKind::Spsa);
        assert_eq!(c.num_candidates, 8);
        assert_eq!(c.max_qubits, 20);
        assert_eq!(c.penalty_factor, 2.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let c = QaoaConfig::default()
            .with_layers(3)
            .with_shots(256)
            .with_max_iterations(40)
            .with_optimizer(OptimizerKind::Adam)
            .with_num_candidates(4)
            .with_max_qubits(12)
            .with_penalty_factor(3.5)
            .with_seed(11);
        assert_eq!(c.layers, 3);
        assert_eq!(c.shots, 256);
        assert_eq!(c.max_iterations, 40);
        assert_eq!(c.optimizer, OptimizerKind::Adam);
        assert_eq!(c.num_candidates, 4);
        assert_eq!(c.max_qubits, 12);
        assert_eq!(c.penalty_factor, 3.5);
        assert_eq!(c.seed, Some(11));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_invalid() {
        assert!(QaoaConfig::default().with_layers(0).validate().is_err());
        assert!(QaoaConfig::default().with_shots(0).validate().is_err());
        assert!(QaoaConfig::default().with_num_candidates(0).validate().is_err());
        assert!(QaoaConfig::default().with_penalty_factor(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let config = QaoaConfig::default()
            .with_optimizer(OptimizerKind::LBfgsB)
            .with_seed(9);
        let json = serde_json::to_string(&config).expect("serializes");
        let back: QaoaConfig = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, config);
    }
}
