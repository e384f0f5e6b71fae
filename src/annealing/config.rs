//! Simulated annealing configuration.

use serde::{Deserialize, Serialize};

use crate::error::VrpError;

/// Configuration for [`AnnealingSolver`](super::AnnealingSolver).
///
/// Temperature starts at `initial_temp` and is multiplied by `cooling_rate`
/// after every accept/reject decision. The run stops when the temperature
/// reaches `final_temp` or `max_iterations` neighbor draws have been spent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnealingConfig {
    /// Starting temperature.
    pub initial_temp: f64,
    /// Stop once the temperature is at or below this value.
    pub final_temp: f64,
    /// Geometric cooling factor in `(0, 1)`.
    pub cooling_rate: f64,
    /// Neighbor draws, rejected ones included. Zero returns the start solution.
    pub max_iterations: usize,
    /// Seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temp: 1000.0,
            final_temp: 1.0,
            cooling_rate: 0.95,
            max_iterations: 1000,
            seed: None,
        }
    }
}

impl AnnealingConfig {
    /// Sets the starting temperature.
    pub fn with_initial_temp(mut self, t: f64) -> Self {
        self.initial_temp = t;
        self
    }

    /// Sets the stopping temperature.
    pub fn with_final_temp(mut self, t: f64) -> Self {
        self.final_temp = t;
        self
    }

    /// Sets the cooling factor.
    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

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

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), VrpError> {
        if !(self.initial_temp.is_finite() && self.initial_temp > 0.0) {
            return Err(VrpError::InvalidConfig(
                "initial_temp must be positive".into(),
            ));
        }
        if !(self.final_temp.is_finite() && self.final_temp > 0.0) {
            return Err(VrpError::InvalidConfig("final_temp must be positive".into()));
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(VrpError::InvalidConfig(
                "cooling_rate must be in (0, 1)".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let c = AnnealingConfig::default();
        assert_eq!(c.initial_temp, 1000.0);
        assert_eq!(c.final_temp, 1.0);
        assert!((c.cooling_rate - 0.95).abs() < 1e-10);
        assert_eq!(c.max_iterations, 1000);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_invalid_cooling() {
        assert!(AnnealingConfig::default()
            .with_cooling_rate(1.0)
            .validate()
            .is_err());
        assert!(AnnealingConfig::default()
            .with_cooling_rate(0.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_invalid_temperature() {
        assert!(AnnealingConfig::default()
            .with_initial_temp(-1.0)
            .validate()
            .is_err());
        assert!(AnnealingConfig::default()
            .with_final_temp(0.0)
            .validate()
            .is_err());
    }
}
