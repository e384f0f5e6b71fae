//! Simultaneous perturbation stochastic approximation.
//!
//! # Algorithm
//!
//! At step `k` draw a Bernoulli ±1 vector `Δ`, evaluate the objective at
//! `x ± c_k·Δ` (clipped), estimate the gradient as
//! `(f⁺ − f⁻) / (2·c_k·Δ)` and step `x ← clip(x − a_k·ĝ)`, with
//!
//! ```text
//! a_k = a / (k + 1 + A)^alpha
//! c_k = c / (k + 1)^gamma
//! ```
//!
//! Two probe evaluations per step regardless of dimension, plus one
//! recorded evaluation of the new iterate.
//!
//! # Reference
//!
//! Spall, J.C. (1992). "Multivariate stochastic approximation using a
//! simultaneous perturbation gradient approximation", *IEEE Transactions on
//! Automatic Control* 37(3), 332-341.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use u_numflow::random::create_rng;

use crate::error::OptimizerError;

use super::types::{clip_all, prepare, Bounds, Objective, OptimizerResult, ParameterOptimizer, Tracker};

/// SPSA gain schedule and budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpsaConfig {
    /// Iterations.
    pub max_iterations: usize,
    /// Step-size numerator.
    pub a: f64,
    /// Perturbation numerator.
    pub c: f64,
    /// Stability constant. `None` uses `max_iterations / 10`.
    pub big_a: Option<f64>,
    /// Step-size decay exponent.
    pub alpha: f64,
    /// Perturbation decay exponent.
    pub gamma: f64,
    /// Seed for the perturbation draws.
    pub seed: Option<u64>,
}

impl Default for SpsaConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            a: 0.602,
            c: 0.101,
            big_a: None,
            alpha: 1.0,
            gamma: 0.167,
            seed: None,
        }
    }
}

impl SpsaConfig {
    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn stability(&self) -> f64 {
        self.big_a
            .unwrap_or((self.max_iterations / 10) as f64)
    }
}

/// SPSA optimizer.
///
/// # Examples
///
/// ```
/// use qfleet_routing::optim::{Bounds, ParameterOptimizer, Spsa, SpsaConfig};
/// use qfleet_routing::error::OptimizerError;
///
/// let spsa = Spsa::new(SpsaConfig::default().with_seed(1).with_max_iterations(200));
/// let mut f = |x: &[f64]| -> Result<f64, OptimizerError> { Ok((x[0] - 1.0).powi(2) + (x[1] + 0.5).powi(2)) };
/// let bounds = [Bounds::new(-2.0, 2.0), Bounds::new(-2.0, 2.0)];
/// let result = spsa.optimize(&mut f, &[0.0, 0.0], &bounds).expect("runs");
/// assert!(result.best_value < 1.25);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Spsa {
    config: SpsaConfig,
}

impl Spsa {
    /// Creates an SPSA optimizer.
    pub fn new(config: SpsaConfig) -> Self {
        Self { config }
    }
}

impl ParameterOptimizer for Spsa {
    fn name(&self) -> String {
        "SPSA".into()
    }

    fn optimize(
        &self,
        objective: &mut Objective<'_>,
        initial: &[f64],
        bounds: &[Bounds],
    ) -> Result<OptimizerResult, OptimizerError> {
        let mut x = prepare(initial, bounds)?;
        let c = &self.config;
        let big_a = c.stability();
        let mut rng = match c.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };

        let mut tracker = Tracker::new(objective);
        tracker.eval(&x)?;

        for k in 0..c.max_iterations {
            let ak = c.a / (k as f64 + 1.0 + big_a).powf(c.alpha);
            let ck = c.c / (k as f64 + 1.0).powf(c.gamma);

            let delta: Vec<f64> = (0..x.len())
                .map(|_| if rng.random_bool(0.5) { 1.0 } else { -1.0 })
                .collect();

            let plus: Vec<f64> = x.iter().zip(&delta).map(|(xi, d)| xi + ck * d).collect();
            let minus: Vec<f64> = x.iter().zip(&delta).map(|(xi, d)| xi - ck * d).collect();
            let f_plus = tracker.probe(&clip_all(&plus, bounds))?;
            let f_minus = tracker.probe(&clip_all(&minus, bounds))?;

            let stepped: Vec<f64> = x
                .iter()
                .zip(&delta)
                .map(|(xi, d)| xi - ak * (f_plus - f_minus) / (2.0 * ck * d))
                .collect();
            x = clip_all(&stepped, bounds);
            tracker.eval(&x)?;
        }

        let result = tracker.finish(&x, c.max_iterations, self.name());
        debug!(best = result.best_value, evaluations = result.evaluations, "spsa finished");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic(x: &[f64]) -> Result<f64, OptimizerError> {
        Ok(x.iter().map(|v| (v - 0.3) * (v - 0.3)).sum())
    }

    #[test]
    fn test_improves_on_start() {
        let spsa = Spsa::new(SpsaConfig::default().with_seed(7));
        let mut f = quadratic;
        let bounds = [Bounds::new(-1.0, 1.0); 3];
        let start = [1.0, -1.0, 1.0];
        let initial_value = quadratic(&start).expect("ok");
        let result = spsa.optimize(&mut f, &start, &bounds).expect("runs");
        assert!(result.best_value < initial_value);
        assert_eq!(result.iteration_count, 100);
        // 1 initial + 3 per iteration
        assert_eq!(result.evaluations, 301);
        assert_eq!(result.history.len(), 101);
    }

    #[test]
    fn test_respects_bounds() {
        let spsa = Spsa::new(SpsaConfig::default().with_seed(3));
        let mut f = |x: &[f64]| -> Result<f64, OptimizerError> { Ok(-x[0]) };
        let bounds = [Bounds::new(0.0, 0.5)];
        let result = spsa.optimize(&mut f, &[0.1], &bounds).expect("runs");
        for (p, _) in &result.history {
            assert!((0.0..=0.5).contains(&p[0]));
        }
        assert!(result.best_params[0] <= 0.5);
    }

    #[test]
    fn test_zero_iterations_returns_initial() {
        let spsa = Spsa::new(SpsaConfig::default().with_max_iterations(0));
        let mut f = quadratic;
        let result = spsa
            .optimize(&mut f, &[0.0], &[Bounds::new(-1.0, 1.0)])
            .expect("runs");
        assert_eq!(result.best_params, vec![0.0]);
        assert!((result.best_value - 0.09).abs() < 1e-12);
    }

    #[test]
    fn test_objective_error_propagates() {
        let spsa = Spsa::default();
        let mut calls = 0;
        let mut f = |_: &[f64]| -> Result<f64, OptimizerError> {
            calls += 1;
            if calls > 2 {
                Err(OptimizerError::Objective("boom".into()))
            } else {
                Ok(0.0)
            }
        };
        let err = spsa
            .optimize(&mut f, &[0.0], &[Bounds::new(-1.0, 1.0)])
            .unwrap_err();
        assert_eq!(err, OptimizerError::Objective("boom".into()));
    }
}
