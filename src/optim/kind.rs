//! Closed set of optimizers, lookup by name and side-by-side comparison.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::OptimizerError;

use super::adam::{Adam, AdamConfig};
use super::derivative_free::{DerivativeFree, Method};
use super::ensemble::{Adaptive, Ensemble, ENSEMBLE_MEMBER_ITERATIONS};
use super::spsa::{Spsa, SpsaConfig};
use super::types::{Bounds, Objective, OptimizerResult, ParameterOptimizer};

/// Default iteration budget for [`OptimizerKind::build`].
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Every optimizer the crate provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptimizerKind {
    /// [`Spsa`].
    Spsa,
    /// [`Adam`].
    Adam,
    /// Bounded simplex.
    Cobyla,
    /// Coordinate golden-section search.
    Powell,
    /// Projected L-BFGS.
    LBfgsB,
    /// Projected L-BFGS.
    Slsqp,
    /// Projected L-BFGS.
    Tnc,
    /// [`Ensemble`] of SPSA, ADAM and COBYLA.
    Ensemble,
    /// [`Adaptive`].
    Adaptive,
}

impl OptimizerKind {
    /// All kinds in display order.
    pub const ALL: [OptimizerKind; 9] = [
        OptimizerKind::Spsa,
        OptimizerKind::Adam,
        OptimizerKind::Cobyla,
        OptimizerKind::Powell,
        OptimizerKind::LBfgsB,
        OptimizerKind::Slsqp,
        OptimizerKind::Tnc,
        OptimizerKind::Ensemble,
        OptimizerKind::Adaptive,
    ];

    /// Parses a name case-insensitively; `_` and `-` are interchangeable.
    ///
    /// # Examples
    ///
    /// ```
    /// use qfleet_routing::optim::OptimizerKind;
    ///
    /// assert_eq!(OptimizerKind::from_name("spsa").unwrap(), OptimizerKind::Spsa);
    /// assert_eq!(OptimizerKind::from_name("l_bfgs_b").unwrap(), OptimizerKind::LBfgsB);
    /// assert!(OptimizerKind::from_name("newton").is_err());
    /// ```
    pub fn from_name(name: &str) -> Result<Self, OptimizerError> {
        let key = name.trim().to_ascii_uppercase().replace('_', "-");
        let kind = match key.as_str() {
            "SPSA" => OptimizerKind::Spsa,
            "ADAM" => OptimizerKind::Adam,
            "COBYLA" => OptimizerKind::Cobyla,
            "POWELL" => OptimizerKind::Powell,
            "L-BFGS-B" | "LBFGSB" | "LBFGS" => OptimizerKind::LBfgsB,
            "SLSQP" => OptimizerKind::Slsqp,
            "TNC" => OptimizerKind::Tnc,
            "ENSEMBLE" => OptimizerKind::Ensemble,
            "ADAPTIVE" => OptimizerKind::Adaptive,
            _ => return Err(OptimizerError::UnknownOptimizer(name.to_string())),
        };
        Ok(kind)
    }

    /// Canonical display name.
    pub fn name(self) -> &'static str {
        match self {
            OptimizerKind::Spsa => "SPSA",
            OptimizerKind::Adam => "ADAM",
            OptimizerKind::Cobyla => "COBYLA",
            OptimizerKind::Powell => "Powell",
            OptimizerKind::LBfgsB => "L-BFGS-B",
            OptimizerKind::Slsqp => "SLSQP",
            OptimizerKind::Tnc => "TNC",
            OptimizerKind::Ensemble => "Ensemble",
            OptimizerKind::Adaptive => "Adaptive",
        }
    }

    /// Builds the optimizer with default budgets.
    ///
    /// The ensemble gives each member [`ENSEMBLE_MEMBER_ITERATIONS`]; every
    /// other kind gets [`DEFAULT_MAX_ITERATIONS`].
    pub fn build(self) -> Box<dyn ParameterOptimizer> {
        match self {
            OptimizerKind::Ensemble => Box::new(Ensemble::standard(ENSEMBLE_MEMBER_ITERATIONS, None)),
            other => other.build_with(DEFAULT_MAX_ITERATIONS, None),
        }
    }

    /// Builds the optimizer with an explicit budget and seed.
    pub fn build_with(self, max_iterations: usize, seed: Option<u64>) -> Box<dyn ParameterOptimizer> {
        match self {
            OptimizerKind::Spsa => Box::new(Spsa::new(SpsaConfig {
                max_iterations,
                seed,
                ..SpsaConfig::default()
            })),
            OptimizerKind::Adam => {
                Box::new(Adam::new(AdamConfig::default().with_max_iterations(max_iterations)))
            }
            OptimizerKind::Cobyla => Box::new(DerivativeFree::new(Method::Cobyla, max_iterations)),
            OptimizerKind::Powell => Box::new(DerivativeFree::new(Method::Powell, max_iterations)),
            OptimizerKind::LBfgsB => Box::new(DerivativeFree::new(Method::LBfgsB, max_iterations)),
            OptimizerKind::Slsqp => Box::new(DerivativeFree::new(Method::Slsqp, max_iterations)),
            OptimizerKind::Tnc => Box::new(DerivativeFree::new(Method::Tnc, max_iterations)),
            OptimizerKind::Ensemble => Box::new(Ensemble::standard(max_iterations, seed)),
            OptimizerKind::Adaptive => Box::new(Adaptive::new(max_iterations, seed)),
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Names accepted by [`OptimizerKind::from_name`], in display form.
pub fn available_optimizers() -> Vec<&'static str> {
    OptimizerKind::ALL.iter().map(|k| k.name()).collect()
}

/// One optimizer's entry in an [`OptimizerComparison`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerRun {
    /// Optimizer name.
    pub name: String,
    /// The result when the run succeeded.
    pub result: Option<OptimizerResult>,
    /// The error message when it failed.
    pub error: Option<String>,
    /// Wall-clock seconds.
    pub execution_time: f64,
}

/// Outcome of [`compare_optimizers`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerComparison {
    /// Runs in request order.
    pub runs: Vec<OptimizerRun>,
    /// Name of the lowest successful run.
    pub best_optimizer: Option<String>,
    /// Its value, infinite when nothing succeeded.
    pub best_value: f64,
    /// Number of successful runs.
    pub successful: usize,
}

/// Runs each optimizer on the same objective and start point.
///
/// Failures are recorded rather than propagated.
///
/// # Examples
///
/// ```
/// use qfleet_routing::error::OptimizerError;
/// use qfleet_routing::optim::{compare_optimizers, Bounds, OptimizerKind};
///
/// let mut f = |x: &[f64]| -> Result<f64, OptimizerError> { Ok(x[0] * x[0]) };
/// let report = compare_optimizers(
///     &mut f,
///     &[0.8],
///     &[Bounds::new(-1.0, 1.0)],
///     &[OptimizerKind::Cobyla, OptimizerKind::Powell],
///     50,
/// );
/// assert_eq!(report.successful, 2);
/// assert!(report.best_value < 1e-3);
/// ```
pub fn compare_optimizers(
    objective: &mut Objective<'_>,
    initial: &[f64],
    bounds: &[Bounds],
    kinds: &[OptimizerKind],
    max_iterations: usize,
) -> OptimizerComparison {
    let mut runs = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let optimizer = kind.build_with(max_iterations, None);
        let start = Instant::now();
        let outcome = optimizer.optimize(&mut *objective, initial, bounds);
        let execution_time = start.elapsed().as_secs_f64();
        let run = match outcome {
            Ok(result) => {
                info!(optimizer = kind.name(), best = result.best_value, "optimizer completed");
                OptimizerRun {
                    name: kind.name().to_string(),
                    result: Some(result),
                    error: None,
                    execution_time,
                }
            }
            Err(e) => {
                warn!(optimizer = kind.name(), error = %e, "optimizer failed");
                OptimizerRun {
                    name: kind.name().to_string(),
                    result: None,
                    error: Some(e.to_string()),
                    execution_time,
                }
            }
        };
        runs.push(run);
    }

    let best = runs
        .iter()
        .filter_map(|r| r.result.as_ref().map(|res| (&r.name, res.best_value)))
        .min_by(|a, b| a.1.total_cmp(&b.1));
    let (best_optimizer, best_value) = match best {
        Some((name, value)) => (Some(name.clone()), value),
        None => (None, f64::INFINITY),
    };
    let successful = runs.iter().filter(|r| r.result.is_some()).count();

    OptimizerComparison {
        runs,
        best_optimizer,
        best_value,
        successful,
    }
}
