//! Exact state-vector simulation of QAOA circuits.
//!
//! # Algorithm
//!
//! The register starts in `|+⟩^n`. Each layer applies the diagonal phase
//! `exp(−iγ·C(z))` to every basis amplitude and then `RX(2β)` to every
//! qubit. The expectation is `Σ |a_z|² C(z)`; samples are inverse-CDF draws
//! over `|a_z|²`.
//!
//! # Complexity
//!
//! O(p · n · 2^n) time and O(2^n) memory per evaluation.

use std::collections::HashMap;
use std::sync::Arc;

use num_complex::Complex64;
use parking_lot::RwLock;
use rand::Rng;
use tracing::{debug, trace};
use u_numflow::random::create_rng;

use crate::error::BackendError;
use crate::qubo::CostModel;

use super::backend::QuantumBackend;
use super::bitstring::{Bitstring, Measurement};

/// Default qubit ceiling.
pub const DEFAULT_MAX_QUBITS: usize = 20;

/// Hard ceiling regardless of configuration; `2^30` amplitudes is 16 GiB.
const QUBIT_CEILING: usize = 30;

/// In-process simulator backend.
///
/// The circuit depth is taken from the parameter count unless fixed with
/// [`with_layers`](Self::with_layers). Diagonal energies of the last model
/// are memoized by fingerprint, so repeated evaluations during one
/// optimization only pay for the circuit.
///
/// # Examples
///
/// ```
/// use qfleet_routing::qubo::CostModel;
/// use qfleet_routing::quantum::{QuantumBackend, StatevectorBackend};
///
/// let mut model = CostModel::zero(1);
/// model.add_linear(0, 1.0);
/// let backend = StatevectorBackend::new();
///
/// // γ = β = 0 leaves the uniform superposition.
/// let e = backend.expectation(&model, &[0.0, 0.0]).expect("fits");
/// assert!((e - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct StatevectorBackend {
    max_qubits: usize,
    layers: Option<usize>,
    seed: Option<u64>,
    report_most_likely: bool,
    energies: RwLock<Option<(u64, Arc<Vec<f64>>)>>,
}

impl Default for StatevectorBackend {
    fn default() -> Self {
        Self {
            max_qubits: DEFAULT_MAX_QUBITS,
            layers: None,
            seed: None,
            report_most_likely: false,
            energies: RwLock::new(None),
        }
    }
}

impl StatevectorBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the qubit ceiling (capped at 30).
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits.min(QUBIT_CEILING);
        self
    }

    /// Requires exactly `2 * layers` parameters.
    pub fn with_layers(mut self, layers: usize) -> Self {
        self.layers = Some(layers);
        self
    }

    /// Seeds the sampling generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Makes [`QuantumBackend::best_measurement`] return the most likely
    /// basis state.
    pub fn with_most_likely(mut self, enabled: bool) -> Self {
        self.report_most_likely = enabled;
        self
    }

    fn check_params(&self, params: &[f64]) -> Result<(), BackendError> {
        let expected = match self.layers {
            Some(p) => 2 * p,
            None if params.is_empty() => 2,
            None => params.len() + params.len() % 2,
        };
        if params.len() != expected || expected == 0 {
            return Err(BackendError::ParameterCount {
                expected,
                actual: params.len(),
            });
        }
        Ok(())
    }

    fn energies(&self, model: &CostModel) -> Result<Arc<Vec<f64>>, BackendError> {
        let n = model.num_bits();
        if n > self.max_qubits {
            return Err(BackendError::TooManyQubits {
                required: n,
                limit: self.max_qubits,
            });
        }
        let fingerprint = model.fingerprint();
        if let Some((key, cached)) = self.energies.read().as_ref() {
            if *key == fingerprint {
                return Ok(Arc::clone(cached));
            }
        }
        trace!(qubits = n, "tabulating diagonal energies");
        let table: Arc<Vec<f64>> =
            Arc::new((0..1usize << n).map(|z| model.energy_of_index(z)).collect());
        *self.energies.write() = Some((fingerprint, Arc::clone(&table)));
        Ok(table)
    }

    fn evolve(energies: &[f64], num_qubits: usize, params: &[f64]) -> Vec<Complex64> {
        let dim = energies.len();
        let uniform = Complex64::new(1.0 / (dim as f64).sqrt(), 0.0);
        let mut state = vec![uniform; dim];
        let (gammas, betas) = params.split_at(params.len() / 2);

        for (&gamma, &beta) in gammas.iter().zip(betas) {
            for (amp, &e) in state.iter_mut().zip(energies) {
                *amp *= Complex64::from_polar(1.0, -gamma * e);
            }
            let cos = beta.cos();
            let off = Complex64::new(0.0, -beta.sin());
            for q in 0..num_qubits {
                let mask = 1usize << q;
                for z in (0..dim).filter(|z| z & mask == 0) {
                    let (a0, a1) = (state[z], state[z | mask]);
                    state[z] = a0 * cos + a1 * off;
                    state[z | mask] = a0 * off + a1 * cos;
                }
            }
        }
        state
    }

    /// Measurement probabilities of every basis state.
    pub fn probabilities(&self, model: &CostModel, params: &[f64]) -> Result<Vec<f64>, BackendError> {
        self.check_params(params)?;
        let energies = self.energies(model)?;
        Ok(Self::evolve(&energies, model.num_bits(), params)
            .iter()
            .map(|a| a.norm_sqr())
            .collect())
    }
}

impl QuantumBackend for StatevectorBackend {
    fn max_qubits(&self) -> usize {
        self.max_qubits
    }

    fn expectation(&self, model: &CostModel, params: &[f64]) -> Result<f64, BackendError> {
        self.check_params(params)?;
        let energies = self.energies(model)?;
        let state = Self::evolve(&energies, model.num_bits(), params);
        let value: f64 = state
            .iter()
            .zip(energies.iter())
            .map(|(a, &e)| a.norm_sqr() * e)
            .sum();
        if !value.is_finite() {
            return Err(BackendError::Evaluation(format!(
                "expectation is not finite: {value}"
            )));
        }
        Ok(value)
    }

    fn sample(
        &self,
        model: &CostModel,
        params: &[f64],
        shots: usize,
    ) -> Result<Vec<Measurement>, BackendError> {
        if shots == 0 {
            return Err(BackendError::InvalidShots);
        }
        let probabilities = self.probabilities(model, params)?;
        let mut cumulative = Vec::with_capacity(probabilities.len());
        let mut total = 0.0;
        for p in &probabilities {
            total += p;
            cumulative.push(total);
        }

        let mut rng = create_rng(self.seed.unwrap_or_else(rand::random::<u64>));
        let last = cumulative.len() - 1;
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for _ in 0..shots {
            let r = rng.random::<f64>() * total;
            let index = cumulative.partition_point(|&c| c <= r).min(last);
            *counts.entry(index).or_insert(0) += 1;
        }

        let mut ranked: Vec<(usize, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        debug!(shots, outcomes = ranked.len(), "sampled circuit");
        Ok(ranked
            .into_iter()
            .map(|(index, count)| Measurement {
                bitstring: Bitstring::from_index(index, model.num_bits()),
                count,
            })
            .collect())
    }

    fn best_measurement(
        &self,
        model: &CostModel,
        params: &[f64],
    ) -> Result<Option<Bitstring>, BackendError> {
        if !self.report_most_likely {
            return Ok(None);
        }
        let probabilities = self.probabilities(model, params)?;
        let best = probabilities
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, &p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((i, p)),
            });
        Ok(best.map(|(i, _)| Bitstring::from_index(i, model.num_bits())))
    }
}
