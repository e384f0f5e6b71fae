//! Ensemble and adaptive meta-optimizers.

use std::fmt;

use tracing::{debug, info, warn};

use crate::error::OptimizerError;

use super::adam::{Adam, AdamConfig};
use super::derivative_free::{DerivativeFree, Method};
use super::spsa::{Spsa, SpsaConfig};
use super::types::{prepare, Bounds, Objective, OptimizerResult, ParameterOptimizer};

/// Iteration budget given to each default ensemble member.
pub const ENSEMBLE_MEMBER_ITERATIONS: usize = 50;

/// Runs every member from the same start and keeps the best outcome.
///
/// Members that fail are logged and skipped. The returned result carries the
/// winner's parameters, history and name; `evaluations` counts the objective
/// calls of all members.
///
/// # Examples
///
/// ```
/// use qfleet_routing::optim::{Bounds, Ensemble, ParameterOptimizer};
/// use qfleet_routing::error::OptimizerError;
///
/// let ensemble = Ensemble::standard(30, Some(5));
/// let mut f = |x: &[f64]| -> Result<f64, OptimizerError> { Ok((x[0] - 0.25).powi(2)) };
/// let result = ensemble.optimize(&mut f, &[1.0], &[Bounds::new(-1.0, 1.0)]).expect("runs");
/// assert!(result.best_value < 0.5);
/// ```
pub struct Ensemble {
    members: Vec<Box<dyn ParameterOptimizer>>,
}

impl Ensemble {
    /// Creates an ensemble over explicit members.
    pub fn new(members: Vec<Box<dyn ParameterOptimizer>>) -> Self {
        Self { members }
    }

    /// SPSA, ADAM and COBYLA, each with `max_iterations`.
    pub fn standard(max_iterations: usize, seed: Option<u64>) -> Self {
        let spsa = SpsaConfig {
            max_iterations,
            seed,
            ..SpsaConfig::default()
        };
        Self::new(vec![
            Box::new(Spsa::new(spsa)),
            Box::new(Adam::new(AdamConfig::default().with_max_iterations(max_iterations))),
            Box::new(DerivativeFree::new(Method::Cobyla, max_iterations)),
        ])
    }

    /// Member names in run order.
    pub fn member_names(&self) -> Vec<String> {
        self.members.iter().map(|m| m.name()).collect()
    }
}

impl Default for Ensemble {
    fn default() -> Self {
        Self::standard(ENSEMBLE_MEMBER_ITERATIONS, None)
    }
}

impl fmt::Debug for Ensemble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ensemble")
            .field("members", &self.member_names())
            .finish()
    }
}

impl ParameterOptimizer for Ensemble {
    fn name(&self) -> String {
        "Ensemble".into()
    }

    fn optimize(
        &self,
        objective: &mut Objective<'_>,
        initial: &[f64],
        bounds: &[Bounds],
    ) -> Result<OptimizerResult, OptimizerError> {
        prepare(initial, bounds)?;

        let mut best: Option<OptimizerResult> = None;
        let mut total_evaluations = 0;
        for member in &self.members {
            debug!(member = %member.name(), "running ensemble member");
            match member.optimize(&mut *objective, initial, bounds) {
                Ok(result) => {
                    total_evaluations += result.evaluations;
                    if best.as_ref().is_none_or(|b| result.best_value < b.best_value) {
                        best = Some(result);
                    }
                }
                Err(e) => warn!(member = %member.name(), error = %e, "ensemble member failed"),
            }
        }

        let mut winner = best.ok_or(OptimizerError::AllFailed {
            attempted: self.members.len(),
        })?;
        info!(winner = %winner.optimizer, best = winner.best_value, "ensemble finished");
        winner.evaluations = total_evaluations;
        Ok(winner)
    }
}

/// Picks a single optimizer from the parameter count and delegates to it.
///
/// | Parameters | Optimizer |
/// |---|---|
/// | ≤ 4 | L-BFGS-B |
/// | ≤ 8 | SPSA |
/// | otherwise | COBYLA |
#[derive(Debug, Clone, Default)]
pub struct Adaptive {
    max_iterations: Option<usize>,
    seed: Option<u64>,
}

impl Adaptive {
    /// Creates an adaptive optimizer passing `max_iterations` and `seed` on
    /// to whichever optimizer it selects.
    pub fn new(max_iterations: usize, seed: Option<u64>) -> Self {
        Self {
            max_iterations: Some(max_iterations),
            seed,
        }
    }

    /// Optimizer chosen for a problem of `dimension` parameters.
    pub fn select(&self, dimension: usize) -> Box<dyn ParameterOptimizer> {
        let max_iterations = self.max_iterations.unwrap_or(100);
        if dimension <= 4 {
            Box::new(DerivativeFree::new(Method::LBfgsB, max_iterations))
        } else if dimension <= 8 {
            Box::new(Spsa::new(SpsaConfig {
                max_iterations,
                seed: self.seed,
                ..SpsaConfig::default()
            }))
        } else {
            Box::new(DerivativeFree::new(Method::Cobyla, max_iterations))
        }
    }
}

impl ParameterOptimizer for Adaptive {
    fn name(&self) -> String {
        "Adaptive".into()
    }

    fn optimize(
        &self,
        objective: &mut Objective<'_>,
        initial: &[f64],
        bounds: &[Bounds],
    ) -> Result<OptimizerResult, OptimizerError> {
        let selected = self.select(initial.len());
        info!(selected = %selected.name(), dimension = initial.len(), "adaptive optimizer selected");
        selected.optimize(objective, initial, bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl ParameterOptimizer for Failing {
        fn name(&self) -> String {
            "Failing".into()
        }

        fn optimize(
            &self,
            _objective: &mut Objective<'_>,
            _initial: &[f64],
            _bounds: &[Bounds],
        ) -> Result<OptimizerResult, OptimizerError> {
            Err(OptimizerError::Objective("always fails".into()))
        }
    }

    fn shifted(x: &[f64]) -> Result<f64, OptimizerError> {
        Ok(x.iter().map(|v| (v - 0.4).powi(2)).sum())
    }

    #[test]
    fn test_default_members() {
        assert_eq!(
            Ensemble::default().member_names(),
            vec!["SPSA".to_string(), "ADAM".into(), "COBYLA".into()]
        );
    }

    #[test]
    fn test_skips_failures() {
        let ensemble = Ensemble::new(vec![
            Box::new(Failing),
            Box::new(DerivativeFree::new(Method::Cobyla, 100)),
        ]);
        let mut f = shifted;
        let result = ensemble
            .optimize(&mut f, &[0.0, 0.0], &[Bounds::new(-1.0, 1.0); 2])
            .expect("one member succeeds");
        assert_eq!(result.optimizer, "COBYLA");
        assert!(result.best_value < 1e-4);
    }

    #[test]
    fn test_all_failed() {
        let ensemble = Ensemble::new(vec![Box::new(Failing), Box::new(Failing)]);
        let mut f = shifted;
        let err = ensemble
            .optimize(&mut f, &[0.0], &[Bounds::new(-1.0, 1.0)])
            .unwrap_err();
        assert_eq!(err, OptimizerError::AllFailed { attempted: 2 });
    }

    #[test]
    fn test_keeps_winner_history() {
        let ensemble = Ensemble::standard(20, Some(11));
        let mut f = shifted;
        let result = ensemble
            .optimize(&mut f, &[-1.0, 1.0], &[Bounds::new(-1.0, 1.0); 2])
            .expect("runs");
        let last_best = result
            .history
            .iter()
            .map(|(_, v)| *v)
            .fold(f64::INFINITY, f64::min);
        assert!((last_best - result.best_value).abs() < 1e-12);
        assert!(result.evaluations >= result.history.len());
    }

    #[test]
    fn test_adaptive_selection() {
        let adaptive = Adaptive::new(10, Some(1));
        assert_eq!(adaptive.select(2).name(), "L-BFGS-B");
        assert_eq!(adaptive.select(4).name(), "L-BFGS-B");
        assert_eq!(adaptive.select(6).name(), "SPSA");
        assert_eq!(adaptive.select(8).name(), "SPSA");
        assert_eq!(adaptive.select(9).name(), "COBYLA");
    }

    #[test]
    fn test_adaptive_reports_selected_name() {
        let mut f = shifted;
        let result = Adaptive::new(50, None)
            .optimize(&mut f, &[0.0, 0.0], &[Bounds::new(-1.0, 1.0); 2])
            .expect("runs");
        assert_eq!(result.optimizer, "L-BFGS-B");
    }
}
