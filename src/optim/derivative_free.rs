//! Classical local optimizers under one wrapper.
//!
//! - [`Method::Cobyla`] — Nelder–Mead simplex with every vertex clipped into
//!   the box. Derivative-free and tolerant of shot noise.
//! - [`Method::Powell`] — Cyclic coordinate sweeps, each a golden-section line
//!   search over the coordinate's full interval.
//! - [`Method::LBfgsB`], [`Method::Slsqp`], [`Method::Tnc`] — Projected
//!   L-BFGS: two-loop recursion on finite-difference gradients, steps clipped
//!   into the box, Armijo backtracking.
//!
//! Every evaluated point, line-search trials included, is recorded in the
//! history. Gradient probes are counted but not recorded.
//!
//! # Reference
//!
//! - Nelder, J.A. & Mead, R. (1965). "A simplex method for function
//!   minimization", *The Computer Journal* 7(4), 308-313.
//! - Nocedal, J. & Wright, S. (2006). *Numerical Optimization*, ch. 7.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::OptimizerError;

use super::adam::finite_difference_gradient;
use super::types::{clip_all, prepare, Bounds, Objective, OptimizerResult, ParameterOptimizer, Tracker};

const SIMPLEX_SCALE: f64 = 0.05;
const SIMPLEX_TOLERANCE: f64 = 1e-8;
const GOLDEN_STEPS: usize = 20;
const LBFGS_MEMORY: usize = 10;
const GRADIENT_STEP: f64 = 1e-6;
const ARMIJO_C1: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 20;

/// Local search method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    /// Bounded simplex search.
    Cobyla,
    /// Coordinate golden-section sweeps.
    Powell,
    /// Projected L-BFGS.
    LBfgsB,
    /// Projected L-BFGS.
    Slsqp,
    /// Projected L-BFGS.
    Tnc,
}

impl Method {
    /// Conventional display name.
    pub fn name(self) -> &'static str {
        match self {
            Method::Cobyla => "COBYLA",
            Method::Powell => "Powell",
            Method::LBfgsB => "L-BFGS-B",
            Method::Slsqp => "SLSQP",
            Method::Tnc => "TNC",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runs one of the [`Method`]s for at most `max_iterations` outer steps.
///
/// # Examples
///
/// ```
/// use qfleet_routing::optim::{Bounds, DerivativeFree, Method, ParameterOptimizer};
/// use qfleet_routing::error::OptimizerError;
///
/// let opt = DerivativeFree::new(Method::Cobyla, 200);
/// let mut f = |x: &[f64]| -> Result<f64, OptimizerError> { Ok((x[0] - 1.0).powi(2) + (x[1] - 2.0).powi(2)) };
/// let bounds = [Bounds::new(0.0, 3.0), Bounds::new(0.0, 3.0)];
/// let result = opt.optimize(&mut f, &[0.5, 0.5], &bounds).expect("runs");
/// assert!(result.best_value < 1e-4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivativeFree {
    method: Method,
    max_iterations: usize,
}

impl DerivativeFree {
    /// Creates the wrapper.
    pub fn new(method: Method, max_iterations: usize) -> Self {
        Self {
            method,
            max_iterations,
        }
    }

    /// The wrapped method.
    pub fn method(&self) -> Method {
        self.method
    }
}

impl ParameterOptimizer for DerivativeFree {
    fn name(&self) -> String {
        self.method.name().to_string()
    }

    fn optimize(
        &self,
        objective: &mut Objective<'_>,
        initial: &[f64],
        bounds: &[Bounds],
    ) -> Result<OptimizerResult, OptimizerError> {
        let x0 = prepare(initial, bounds)?;
        let mut tracker = Tracker::new(objective);
        let (x, iterations) = match self.method {
            Method::Cobyla => nelder_mead(&mut tracker, x0, bounds, self.max_iterations)?,
            Method::Powell => coordinate_search(&mut tracker, x0, bounds, self.max_iterations)?,
            Method::LBfgsB | Method::Slsqp | Method::Tnc => {
                projected_lbfgs(&mut tracker, x0, bounds, self.max_iterations)?
            }
        };
        let result = tracker.finish(&x, iterations, self.name());
        debug!(
            method = %self.method,
            iterations,
            best = result.best_value,
            "local optimizer finished"
        );
        Ok(result)
    }
}

fn nelder_mead(
    tracker: &mut Tracker<'_, '_>,
    x0: Vec<f64>,
    bounds: &[Bounds],
    max_iterations: usize,
) -> Result<(Vec<f64>, usize), OptimizerError> {
    let n = x0.len();
    let mut simplex = vec![x0.clone()];
    for (i, b) in bounds.iter().enumerate() {
        let step = SIMPLEX_SCALE * b.width();
        let mut vertex = x0.clone();
        vertex[i] = if vertex[i] + step <= b.high {
            vertex[i] + step
        } else {
            vertex[i] - step
        };
        simplex.push(vertex);
    }
    let mut values = Vec::with_capacity(n + 1);
    for vertex in &simplex {
        values.push(tracker.eval(vertex)?);
    }

    let mut iterations = 0;
    while iterations < max_iterations {
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        let (best, worst, second_worst) = (order[0], order[n], order[n.saturating_sub(1)]);

        if values[worst] - values[best] < SIMPLEX_TOLERANCE && simplex_size(&simplex) < SIMPLEX_TOLERANCE {
            break;
        }
        iterations += 1;

        let mut centroid = vec![0.0; n];
        for &idx in &order[..n] {
            for (c, v) in centroid.iter_mut().zip(&simplex[idx]) {
                *c += v / n as f64;
            }
        }
        let toward = |from: &[f64], coeff: f64| -> Vec<f64> {
            let raw: Vec<f64> = from
                .iter()
                .zip(&centroid)
                .map(|(p, c)| c + coeff * (p - c))
                .collect();
            clip_all(&raw, bounds)
        };

        let reflected = toward(&simplex[worst], -1.0);
        let f_reflected = tracker.eval(&reflected)?;

        if f_reflected < values[best] {
            let expanded = toward(&simplex[worst], -2.0);
            let f_expanded = tracker.eval(&expanded)?;
            if f_expanded < f_reflected {
                simplex[worst] = expanded;
                values[worst] = f_expanded;
            } else {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
            }
        } else if f_reflected < values[second_worst] {
            simplex[worst] = reflected;
            values[worst] = f_reflected;
        } else {
            let contracted = if f_reflected < values[worst] {
                toward(&reflected, 0.5)
            } else {
                toward(&simplex[worst], 0.5)
            };
            let f_contracted = tracker.eval(&contracted)?;
            if f_contracted < values[worst].min(f_reflected) {
                simplex[worst] = contracted;
                values[worst] = f_contracted;
            } else {
                let anchor = simplex[best].clone();
                for idx in 0..=n {
                    if idx == best {
                        continue;
                    }
                    for (v, a) in simplex[idx].iter_mut().zip(&anchor) {
                        *v = a + 0.5 * (*v - a);
                    }
                    values[idx] = tracker.eval(&simplex[idx])?;
                }
            }
        }
    }

    let best = (0..=n)
        .min_by(|&a, &b| values[a].total_cmp(&values[b]))
        .unwrap_or(0);
    Ok((simplex.swap_remove(best), iterations))
}

fn simplex_size(simplex: &[Vec<f64>]) -> f64 {
    let first = &simplex[0];
    simplex[1..]
        .iter()
        .map(|v| {
            v.iter()
                .zip(first)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max)
        })
        .fold(0.0, f64::max)
}

fn coordinate_search(
    tracker: &mut Tracker<'_, '_>,
    mut x: Vec<f64>,
    bounds: &[Bounds],
    max_iterations: usize,
) -> Result<(Vec<f64>, usize), OptimizerError> {
    const INV_PHI: f64 = 0.618_033_988_749_895;

    let mut fx = tracker.eval(&x)?;
    let mut iterations = 0;
    while iterations < max_iterations {
        iterations += 1;
        let start = fx;
        for i in 0..x.len() {
            if bounds[i].width() <= 0.0 {
                continue;
            }
            let (mut a, mut b) = (bounds[i].low, bounds[i].high);
            let mut probe = x.clone();
            let mut c = b - INV_PHI * (b - a);
            let mut d = a + INV_PHI * (b - a);
            let mut fc = eval_coordinate(tracker, &mut probe, i, c)?;
            let mut fd = eval_coordinate(tracker, &mut probe, i, d)?;
            for _ in 0..GOLDEN_STEPS {
                if fc < fd {
                    b = d;
                    d = c;
                    fd = fc;
                    c = b - INV_PHI * (b - a);
                    fc = eval_coordinate(tracker, &mut probe, i, c)?;
                } else {
                    a = c;
                    c = d;
                    fc = fd;
                    d = a + INV_PHI * (b - a);
                    fd = eval_coordinate(tracker, &mut probe, i, d)?;
                }
            }
            let (t, ft) = if fc < fd { (c, fc) } else { (d, fd) };
            if ft < fx {
                x[i] = t;
                fx = ft;
            }
        }
        if start - fx <= 1e-12 * (1.0 + start.abs()) {
            break;
        }
    }
    Ok((x, iterations))
}

fn eval_coordinate(
    tracker: &mut Tracker<'_, '_>,
    probe: &mut [f64],
    i: usize,
    t: f64,
) -> Result<f64, OptimizerError> {
    probe[i] = t;
    tracker.eval(probe)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn lbfgs_direction(gradient: &[f64], s_hist: &[Vec<f64>], y_hist: &[Vec<f64>]) -> Vec<f64> {
    let m = s_hist.len();
    let mut q = gradient.to_vec();
    let mut alpha = vec![0.0; m];
    let rho: Vec<f64> = (0..m).map(|i| 1.0 / dot(&y_hist[i], &s_hist[i])).collect();

    for i in (0..m).rev() {
        alpha[i] = rho[i] * dot(&s_hist[i], &q);
        for (qj, yj) in q.iter_mut().zip(&y_hist[i]) {
            *qj -= alpha[i] * yj;
        }
    }
    let scale = match (s_hist.last(), y_hist.last()) {
        (Some(s), Some(y)) => dot(s, y) / dot(y, y),
        _ => 1.0,
    };
    let mut r: Vec<f64> = q.iter().map(|qi| scale * qi).collect();
    for i in 0..m {
        let beta = rho[i] * dot(&y_hist[i], &r);
        for (rj, sj) in r.iter_mut().zip(&s_hist[i]) {
            *rj += sj * (alpha[i] - beta);
        }
    }
    r.iter().map(|ri| -ri).collect()
}

fn projected_lbfgs(
    tracker: &mut Tracker<'_, '_>,
    mut x: Vec<f64>,
    bounds: &[Bounds],
    max_iterations: usize,
) -> Result<(Vec<f64>, usize), OptimizerError> {
    let mut fx = tracker.eval(&x)?;
    let mut g = finite_difference_gradient(tracker, &x, bounds, GRADIENT_STEP)?;
    let mut s_hist: Vec<Vec<f64>> = Vec::new();
    let mut y_hist: Vec<Vec<f64>> = Vec::new();
    let mut iterations = 0;

    while iterations < max_iterations {
        let projected: Vec<f64> = x
            .iter()
            .zip(&g)
            .zip(bounds)
            .map(|((xi, gi), b)| b.clip(xi - gi) - xi)
            .collect();
        if dot(&projected, &projected).sqrt() < 1e-8 {
            break;
        }
        iterations += 1;

        let mut direction = lbfgs_direction(&g, &s_hist, &y_hist);
        if dot(&direction, &g) >= 0.0 {
            direction = g.iter().map(|gi| -gi).collect();
            s_hist.clear();
            y_hist.clear();
        }

        let mut step = 1.0;
        let mut accepted = None;
        for _ in 0..MAX_BACKTRACKS {
            let raw: Vec<f64> = x.iter().zip(&direction).map(|(xi, di)| xi + step * di).collect();
            let candidate = clip_all(&raw, bounds);
            let moved: Vec<f64> = candidate.iter().zip(&x).map(|(c, xi)| c - xi).collect();
            let f_candidate = tracker.eval(&candidate)?;
            if f_candidate <= fx + ARMIJO_C1 * dot(&g, &moved) && dot(&moved, &moved) > 0.0 {
                accepted = Some((candidate, f_candidate, moved));
                break;
            }
            step *= 0.5;
        }
        let Some((next, f_next, s)) = accepted else {
            break;
        };

        let g_next = finite_difference_gradient(tracker, &next, bounds, GRADIENT_STEP)?;
        let y: Vec<f64> = g_next.iter().zip(&g).map(|(a, b)| a - b).collect();
        if dot(&s, &y) > 1e-10 {
            if s_hist.len() == LBFGS_MEMORY {
                s_hist.remove(0);
                y_hist.remove(0);
            }
            s_hist.push(s);
            y_hist.push(y);
        }
        x = next;
        fx = f_next;
        g = g_next;
    }
    Ok((x, iterations))
}
