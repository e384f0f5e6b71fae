//! ADAM with central finite-difference gradients.
//!
//! # Algorithm
//!
//! Each step estimates `∇f` coordinate-wise with central differences
//! (2·n probes), updates biased first and second moments, applies the bias
//! correction and moves `x ← clip(x − lr · m̂ / (√v̂ + ε))`. The new iterate is
//! evaluated and recorded.
//!
//! # Reference
//!
//! Kingma, D.P. & Ba, J. (2015). "Adam: A Method for Stochastic
//! Optimization", *ICLR*.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::OptimizerError;

use super::types::{prepare, Bounds, Objective, OptimizerResult, ParameterOptimizer, Tracker};

/// ADAM hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdamConfig {
    /// Iterations.
    pub max_iterations: usize,
    /// Learning rate.
    pub learning_rate: f64,
    /// First-moment decay.
    pub beta1: f64,
    /// Second-moment decay.
    pub beta2: f64,
    /// Denominator guard.
    pub epsilon: f64,
    /// Half-width of the central difference.
    pub fd_step: f64,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            learning_rate: 0.01,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            fd_step: 1e-6,
        }
    }
}

impl AdamConfig {
    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the learning rate.
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }
}

/// Central-difference gradient with probes clipped into `bounds`.
///
/// A coordinate whose interval has zero width gets a zero component.
pub(crate) fn finite_difference_gradient(
    tracker: &mut Tracker<'_, '_>,
    x: &[f64],
    bounds: &[Bounds],
    step: f64,
) -> Result<Vec<f64>, OptimizerError> {
    let mut gradient = vec![0.0; x.len()];
    for i in 0..x.len() {
        let hi = bounds[i].clip(x[i] + step);
        let lo = bounds[i].clip(x[i] - step);
        let span = hi - lo;
        if span <= 0.0 {
            continue;
        }
        let mut plus = x.to_vec();
        plus[i] = hi;
        let mut minus = x.to_vec();
        minus[i] = lo;
        let f_plus = tracker.probe(&plus)?;
        let f_minus = tracker.probe(&minus)?;
        gradient[i] = (f_plus - f_minus) / span;
    }
    Ok(gradient)
}

/// ADAM optimizer.
///
/// # Examples
///
/// ```
/// use qfleet_routing::optim::{Adam, AdamConfig, Bounds, ParameterOptimizer};
/// use qfleet_routing::error::OptimizerError;
///
/// let adam = Adam::new(AdamConfig::default().with_learning_rate(0.1));
/// let mut f = |x: &[f64]| -> Result<f64, OptimizerError> { Ok((x[0] - 0.5).powi(2)) };
/// let result = adam.optimize(&mut f, &[0.0], &[Bounds::new(-1.0, 1.0)]).expect("runs");
/// assert!((result.best_params[0] - 0.5).abs() < 0.1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Adam {
    config: AdamConfig,
}

impl Adam {
    /// Creates an ADAM optimizer.
    pub fn new(config: AdamConfig) -> Self {
        Self { config }
    }
}

impl ParameterOptimizer for Adam {
    fn name(&self) -> String {
        "ADAM".into()
    }

    fn optimize(
        &self,
        objective: &mut Objective<'_>,
        initial: &[f64],
        bounds: &[Bounds],
    ) -> Result<OptimizerResult, OptimizerError> {
        let mut x = prepare(initial, bounds)?;
        let c = &self.config;
        let n = x.len();
        let mut m = vec![0.0; n];
        let mut v = vec![0.0; n];

        let mut tracker = Tracker::new(objective);
        tracker.eval(&x)?;

        for t in 1..=c.max_iterations {
            let g = finite_difference_gradient(&mut tracker, &x, bounds, c.fd_step)?;
            let bias1 = 1.0 - c.beta1.powi(t as i32);
            let bias2 = 1.0 - c.beta2.powi(t as i32);
            for i in 0..n {
                m[i] = c.beta1 * m[i] + (1.0 - c.beta1) * g[i];
                v[i] = c.beta2 * v[i] + (1.0 - c.beta2) * g[i] * g[i];
                let m_hat = m[i] / bias1;
                let v_hat = v[i] / bias2;
                x[i] = bounds[i].clip(x[i] - c.learning_rate * m_hat / (v_hat.sqrt() + c.epsilon));
            }
            tracker.eval(&x)?;
        }

        let result = tracker.finish(&x, c.max_iterations, self.name());
        debug!(best = result.best_value, evaluations = result.evaluations, "adam finished");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descends_quadratic() {
        let adam = Adam::new(AdamConfig::default().with_learning_rate(0.05));
        let mut f = |x: &[f64]| -> Result<f64, OptimizerError> {
            Ok((x[0] - 0.2).powi(2) + (x[1] + 0.4).powi(2))
        };
        let bounds = [Bounds::new(-1.0, 1.0); 2];
        let result = adam.optimize(&mut f, &[1.0, 1.0], &bounds).expect("runs");
        assert!(result.best_value < 0.05);
        // 1 initial + (2·n probes + 1) per iteration
        assert_eq!(result.evaluations, 1 + 100 * 5);
        assert_eq!(result.history.len(), 101);
    }

    #[test]
    fn test_clips_to_bounds() {
        let adam = Adam::new(AdamConfig::default().with_learning_rate(0.5));
        let mut f = |x: &[f64]| -> Result<f64, OptimizerError> { Ok(x[0]) };
        let result = adam
            .optimize(&mut f, &[0.5], &[Bounds::new(0.0, 1.0)])
            .expect("runs");
        assert!((result.best_params[0] - 0.0).abs() < 1e-10);
        assert!(result.history.iter().all(|(p, _)| (0.0..=1.0).contains(&p[0])));
    }

    #[test]
    fn test_gradient_at_degenerate_bounds() {
        let mut f = |x: &[f64]| -> Result<f64, OptimizerError> { Ok(3.0 * x[0] + x[1]) };
        let mut tracker = Tracker::new(&mut f);
        let bounds = [Bounds::new(1.0, 1.0), Bounds::new(-1.0, 1.0)];
        let g = finite_difference_gradient(&mut tracker, &[1.0, 0.0], &bounds, 1e-6)
            .expect("ok");
        assert_eq!(g[0], 0.0);
        assert!((g[1] - 1.0).abs() < 1e-6);
    }
}
