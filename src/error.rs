//! Error types for routing, parameter optimization and quantum evaluation.

use thiserror::Error;

/// Errors raised by a quantum evaluation backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    /// The cost model needs more qubits than the backend can hold.
    #[error("cost model needs {required} qubits, backend supports at most {limit}")]
    TooManyQubits {
        /// Qubits required by the model.
        required: usize,
        /// Backend limit.
        limit: usize,
    },

    /// Parameter vector does not match the circuit depth.
    #[error("expected {expected} circuit parameters, got {actual}")]
    ParameterCount {
        /// `2 * layers`.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// Sampling was requested with zero shots.
    #[error("shot count must be positive")]
    InvalidShots,

    /// Any other evaluation failure.
    #[error("backend evaluation failed: {0}")]
    Evaluation(String),
}

/// Errors raised by a parameter optimizer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizerError {
    /// `initial` and `bounds` lengths differ.
    #[error("dimension mismatch: {params} parameters but {bounds} bounds")]
    DimensionMismatch {
        /// Number of parameters.
        params: usize,
        /// Number of bounds.
        bounds: usize,
    },

    /// A bound has `low > high` or a non-finite endpoint.
    #[error("invalid bounds at index {index}: [{low}, {high}]")]
    InvalidBounds {
        /// Offending dimension.
        index: usize,
        /// Lower endpoint.
        low: f64,
        /// Upper endpoint.
        high: f64,
    },

    /// Zero-dimensional parameter vector.
    #[error("parameter vector is empty")]
    EmptyParameters,

    /// The objective returned an error or a non-finite value.
    #[error("objective evaluation failed: {0}")]
    Objective(String),

    /// The objective failed inside the quantum backend.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Every member of an ensemble failed.
    #[error("all optimizers failed ({attempted} attempted)")]
    AllFailed {
        /// Number of optimizers that were tried.
        attempted: usize,
    },

    /// Name lookup failed.
    #[error("unknown optimizer '{0}'")]
    UnknownOptimizer(String),
}

/// Top-level error for problem construction and solving.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VrpError {
    /// The problem instance is malformed.
    #[error("invalid problem: {0}")]
    InvalidProblem(String),

    /// A solver or optimizer configuration is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Name lookup failed.
    #[error("unknown algorithm '{0}'")]
    UnknownAlgorithm(String),

    /// The QUBO would need more qubits than allowed.
    #[error("instance needs {required} qubits, limit is {limit}")]
    InfeasibleSize {
        /// `D * (D - 1)`.
        required: usize,
        /// Configured ceiling.
        limit: usize,
    },

    /// Parameter optimization failed.
    #[error(transparent)]
    Optimizer(#[from] OptimizerError),

    /// No usable route could be decoded.
    #[error("decode failed: {0}")]
    Decode(String),

    /// Quantum backend failure.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A solver failed in a way not covered above.
    #[error("{algorithm} failed: {message}")]
    Solver {
        /// Algorithm name.
        algorithm: String,
        /// Failure description.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infeasible_size_message() {
        let err = VrpError::InfeasibleSize {
            required: 30,
            limit: 20,
        };
        let msg = err.to_string();
        assert!(msg.contains("30"));
        assert!(msg.contains("20"));
    }

    #[test]
    fn test_backend_error_converts() {
        let err: OptimizerError = BackendError::InvalidShots.into();
        assert_eq!(err, OptimizerError::Backend(BackendError::InvalidShots));
        let top: VrpError = err.into();
        assert!(matches!(top, VrpError::Optimizer(_)));
    }

    #[test]
    fn test_all_failed_message() {
        let err = OptimizerError::AllFailed { attempted: 3 };
        assert_eq!(err.to_string(), "all optimizers failed (3 attempted)");
    }
}
