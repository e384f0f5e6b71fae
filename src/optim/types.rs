//! Shared optimizer types.

use serde::{Deserialize, Serialize};

use crate::error::OptimizerError;

/// Closed interval for one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Lower endpoint.
    pub low: f64,
    /// Upper endpoint.
    pub high: f64,
}

impl Bounds {
    /// Creates `[low, high]`.
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Clamps `x` into the interval.
    pub fn clip(&self, x: f64) -> f64 {
        x.clamp(self.low, self.high)
    }

    /// `high - low`.
    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

/// The function being minimized.
///
/// Returning an error aborts the optimizer that called it.
pub type Objective<'a> = dyn FnMut(&[f64]) -> Result<f64, OptimizerError> + 'a;

/// Outcome of one optimizer run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerResult {
    /// Best-ever parameters.
    pub best_params: Vec<f64>,
    /// Objective value at `best_params`.
    pub best_value: f64,
    /// Main-loop iterations completed.
    pub iteration_count: usize,
    /// Objective calls, gradient probes included.
    pub evaluations: usize,
    /// Recorded `(params, value)` points in evaluation order.
    pub history: Vec<(Vec<f64>, f64)>,
    /// Name of the optimizer that produced `best_params`.
    pub optimizer: String,
}

/// A black-box minimizer over a box-bounded parameter space.
///
/// Implementations are stateless between calls; every call starts fresh.
pub trait ParameterOptimizer: Send + Sync {
    /// Display name.
    fn name(&self) -> String;

    /// Minimizes `objective` starting from `initial` within `bounds`.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizerError::DimensionMismatch`] or
    /// [`OptimizerError::InvalidBounds`] for malformed input, and propagates
    /// the first error raised by `objective`.
    fn optimize(
        &self,
        objective: &mut Objective<'_>,
        initial: &[f64],
        bounds: &[Bounds],
    ) -> Result<OptimizerResult, OptimizerError>;
}

/// Checks dimensions and bounds, returning `initial` clipped into the box.
pub fn prepare(initial: &[f64], bounds: &[Bounds]) -> Result<Vec<f64>, OptimizerError> {
    if initial.is_empty() {
        return Err(OptimizerError::EmptyParameters);
    }
    if initial.len() != bounds.len() {
        return Err(OptimizerError::DimensionMismatch {
            params: initial.len(),
            bounds: bounds.len(),
        });
    }
    for (index, b) in bounds.iter().enumerate() {
        if !(b.low.is_finite() && b.high.is_finite()) || b.low > b.high {
            return Err(OptimizerError::InvalidBounds {
                index,
                low: b.low,
                high: b.high,
            });
        }
    }
    Ok(clip_all(initial, bounds))
}

/// Clamps every coordinate into its bounds.
pub fn clip_all(x: &[f64], bounds: &[Bounds]) -> Vec<f64> {
    x.iter().zip(bounds).map(|(&v, b)| b.clip(v)).collect()
}

/// Wraps an objective, counting calls and tracking the best recorded point.
pub(crate) struct Tracker<'o, 'a> {
    objective: &'o mut Objective<'a>,
    evaluations: usize,
    history: Vec<(Vec<f64>, f64)>,
    best: Option<(Vec<f64>, f64)>,
}

impl<'o, 'a> Tracker<'o, 'a> {
    pub(crate) fn new(objective: &'o mut Objective<'a>) -> Self {
        Self {
            objective,
            evaluations: 0,
            history: Vec::new(),
            best: None,
        }
    }

    /// Evaluates without recording (gradient probes).
    pub(crate) fn probe(&mut self, x: &[f64]) -> Result<f64, OptimizerError> {
        self.evaluations += 1;
        let value = (self.objective)(x)?;
        if !value.is_finite() {
            return Err(OptimizerError::Objective(format!(
                "objective returned non-finite value {value}"
            )));
        }
        Ok(value)
    }

    /// Evaluates, appends to history and updates the best-ever point.
    pub(crate) fn eval(&mut self, x: &[f64]) -> Result<f64, OptimizerError> {
        let value = self.probe(x)?;
        self.history.push((x.to_vec(), value));
        if self.best.as_ref().is_none_or(|(_, v)| value < *v) {
            self.best = Some((x.to_vec(), value));
        }
        Ok(value)
    }

    pub(crate) fn finish(
        self,
        fallback: &[f64],
        iteration_count: usize,
        optimizer: String,
    ) -> OptimizerResult {
        let (best_params, best_value) = self
            .best
            .unwrap_or_else(|| (fallback.to_vec(), f64::INFINITY));
        OptimizerResult {
            best_params,
            best_value,
            iteration_count,
            evaluations: self.evaluations,
            history: self.history,
            optimizer,
        }
    }
}
