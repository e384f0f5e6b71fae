//! Shared cache of built cost models.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::VrpError;
use crate::models::Problem;

use super::cost_model::CostModel;
use super::formulation::build_with_factor;

/// Thread-safe map from problem fingerprints to cost models.
///
/// Keys hash the distance matrix bits, fleet size, depot and penalty factor,
/// so two problems share an entry only when they build the same model.
///
/// # Examples
///
/// ```
/// use qfleet_routing::models::Problem;
/// use qfleet_routing::qubo::CostModelCache;
///
/// let cache = CostModelCache::new();
/// let problem = Problem::from_points(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)], 1, 0).expect("valid");
/// let a = cache.get_or_build(&problem, 2.0).expect("builds");
/// let b = cache.get_or_build(&problem, 2.0).expect("cached");
/// assert!(std::sync::Arc::ptr_eq(&a, &b));
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct CostModelCache {
    entries: RwLock<HashMap<u64, Arc<CostModel>>>,
}

impl CostModelCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached model for `problem`, building it on a miss.
    pub fn get_or_build(
        &self,
        problem: &Problem,
        penalty_factor: f64,
    ) -> Result<Arc<CostModel>, VrpError> {
        let key = cache_key(problem, penalty_factor);
        if let Some(model) = self.entries.read().get(&key) {
            debug!(key, "cost model cache hit");
            return Ok(Arc::clone(model));
        }

        let built = Arc::new(build_with_factor(
            problem.distances(),
            problem.num_vehicles(),
            problem.depot(),
            penalty_factor,
        )?);
        let mut entries = self.entries.write();
        // Another thread may have inserted while we were building.
        let model = entries.entry(key).or_insert(built);
        Ok(Arc::clone(model))
    }

    /// Number of cached models.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no model is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drops every entry. Models already handed out stay alive.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        debug!(entries = entries.len(), "clearing cost model cache");
        entries.clear();
    }
}

fn cache_key(problem: &Problem, penalty_factor: f64) -> u64 {
    let mut hasher = DefaultHasher::new();
    let distances = problem.distances();
    distances.size().hash(&mut hasher);
    for d in distances.as_slice() {
        d.to_bits().hash(&mut hasher);
    }
    problem.num_vehicles().hash(&mut hasher);
    problem.depot().hash(&mut hasher);
    penalty_factor.to_bits().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn triangle(vehicles: usize) -> Problem {
        Problem::from_points(&[(0.0, 0.0), (3.0, 0.0), (0.0, 4.0)], vehicles, 0).expect("valid")
    }

    #[test]
    fn test_distinct_keys() {
        let cache = CostModelCache::new();
        cache.get_or_build(&triangle(1), 2.0).expect("builds");
        cache.get_or_build(&triangle(2), 2.0).expect("builds");
        cache.get_or_build(&triangle(1), 3.0).expect("builds");
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = CostModelCache::new();
        assert!(cache.get_or_build(&triangle(1), -1.0).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_through_shared_handle() {
        let cache = Arc::new(CostModelCache::new());
        let shared = Arc::clone(&cache);
        let model = cache.get_or_build(&triangle(1), 2.0).expect("builds");
        shared.clear();
        assert_eq!(cache.len(), 0);
        // A later lookup rebuilds instead of returning the dropped entry.
        let rebuilt = cache.get_or_build(&triangle(1), 2.0).expect("builds");
        assert!(!Arc::ptr_eq(&model, &rebuilt));
        assert_eq!(model, rebuilt);
    }

    #[test]
    fn test_concurrent_access_shares_one_entry() {
        let cache = Arc::new(CostModelCache::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.get_or_build(&triangle(1), 2.0).expect("builds"))
            })
            .collect();
        let models: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .collect();
        assert_eq!(cache.len(), 1);
        assert!(models.windows(2).all(|w| w[0] == w[1]));
    }
}
