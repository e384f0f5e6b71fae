//! Sparse quadratic binary cost model.

use std::collections::BTreeMap;
use std::hash::{DefaultHasher, Hash, Hasher};

/// `E(x) = constant + Σ linear[i]·x_i + Σ quadratic[(i, j)]·x_i·x_j`.
///
/// Quadratic keys are unordered pairs stored as `(min, max)`.
///
/// # Examples
///
/// ```
/// use qfleet_routing::qubo::CostModel;
///
/// let mut model = CostModel::zero(2);
/// model.add_linear(0, 1.5);
/// model.add_quadratic(1, 0, -2.0);
/// model.add_constant(0.5);
/// assert_eq!(model.energy(&[true, false]), 2.0);
/// assert_eq!(model.energy(&[true, true]), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CostModel {
    num_bits: usize,
    linear: BTreeMap<usize, f64>,
    quadratic: BTreeMap<(usize, usize), f64>,
    constant: f64,
    penalty_strength: f64,
    penalty_dominates: bool,
}

impl CostModel {
    /// Empty model over `num_bits` variables.
    pub fn zero(num_bits: usize) -> Self {
        Self {
            num_bits,
            linear: BTreeMap::new(),
            quadratic: BTreeMap::new(),
            constant: 0.0,
            penalty_strength: 0.0,
            penalty_dominates: true,
        }
    }

    /// Number of binary variables.
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Linear coefficients.
    pub fn linear(&self) -> &BTreeMap<usize, f64> {
        &self.linear
    }

    /// Quadratic coefficients keyed by `(low, high)` bit pairs.
    pub fn quadratic(&self) -> &BTreeMap<(usize, usize), f64> {
        &self.quadratic
    }

    /// Constant offset.
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Weight applied to constraint penalties.
    pub fn penalty_strength(&self) -> f64 {
        self.penalty_strength
    }

    /// Whether the penalty exceeds the largest objective of a
    /// degree-feasible assignment.
    pub fn penalty_dominates(&self) -> bool {
        self.penalty_dominates
    }

    pub(crate) fn set_penalty(&mut self, strength: f64, dominates: bool) {
        self.penalty_strength = strength;
        self.penalty_dominates = dominates;
    }

    /// Adds `weight` to bit `i`.
    pub fn add_linear(&mut self, i: usize, weight: f64) {
        *self.linear.entry(i).or_insert(0.0) += weight;
    }

    /// Adds `weight` to the pair `{i, j}`; `i == j` folds into the linear term.
    pub fn add_quadratic(&mut self, i: usize, j: usize, weight: f64) {
        if i == j {
            self.add_linear(i, weight);
            return;
        }
        let key = (i.min(j), i.max(j));
        *self.quadratic.entry(key).or_insert(0.0) += weight;
    }

    /// Adds to the constant offset.
    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// Drops every coefficient with magnitude below `tolerance`.
    pub fn prune(&mut self, tolerance: f64) {
        self.linear.retain(|_, w| w.abs() >= tolerance);
        self.quadratic.retain(|_, w| w.abs() >= tolerance);
    }

    /// Number of non-constant terms.
    pub fn num_terms(&self) -> usize {
        self.linear.len() + self.quadratic.len()
    }

    /// True when there are no linear or quadratic terms.
    pub fn is_empty(&self) -> bool {
        self.num_terms() == 0
    }

    /// Evaluates the model. Bits beyond `bits.len()` read as zero.
    pub fn energy(&self, bits: &[bool]) -> f64 {
        let on = |i: usize| bits.get(i).copied().unwrap_or(false);
        let mut e = self.constant;
        for (&i, &w) in &self.linear {
            if on(i) {
                e += w;
            }
        }
        for (&(i, j), &w) in &self.quadratic {
            if on(i) && on(j) {
                e += w;
            }
        }
        e
    }

    /// Evaluates the model on the basis state `index` (bit `i` is
    /// `(index >> i) & 1`).
    pub fn energy_of_index(&self, index: usize) -> f64 {
        let on = |i: usize| i < usize::BITS as usize && (index >> i) & 1 == 1;
        let mut e = self.constant;
        for (&i, &w) in &self.linear {
            if on(i) {
                e += w;
            }
        }
        for (&(i, j), &w) in &self.quadratic {
            if on(i) && on(j) {
                e += w;
            }
        }
        e
    }

    /// Stable fingerprint of the coefficients.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.num_bits.hash(&mut hasher);
        self.constant.to_bits().hash(&mut hasher);
        for (i, w) in &self.linear {
            i.hash(&mut hasher);
            w.to_bits().hash(&mut hasher);
        }
        for (k, w) in &self.quadratic {
            k.hash(&mut hasher);
            w.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }
}
