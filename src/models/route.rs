//! Route type.

use serde::{Deserialize, Serialize};

use crate::distance::DistanceMatrix;

/// An ordered sequence of stops driven by one vehicle.
///
/// Routes produced by the solvers always start and end at the depot. Routes
/// handed in from outside may omit either endpoint; [`Route::normalized`]
/// restores them.
///
/// # Examples
///
/// ```
/// use qfleet_routing::models::Route;
///
/// let route = Route::from_customers(0, &[2, 1]);
/// assert_eq!(route.stops(), &[0, 2, 1, 0]);
/// assert_eq!(route.customers(0), &[2, 1]);
/// assert_eq!(route.len(0), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    stops: Vec<usize>,
}

impl Route {
    /// Wraps a raw stop sequence as given.
    pub fn new(stops: Vec<usize>) -> Self {
        Self { stops }
    }

    /// Builds `depot → customers… → depot`.
    pub fn from_customers(depot: usize, customers: &[usize]) -> Self {
        let mut stops = Vec::with_capacity(customers.len() + 2);
        stops.push(depot);
        stops.extend_from_slice(customers);
        stops.push(depot);
        Self { stops }
    }

    /// All stops including depot endpoints.
    pub fn stops(&self) -> &[usize] {
        &self.stops
    }

    /// Interior stops: the sequence with one leading and one trailing
    /// `depot` stripped when present.
    pub fn customers(&self, depot: usize) -> &[usize] {
        let mut s = self.stops.as_slice();
        if let Some((&first, rest)) = s.split_first() {
            if first == depot {
                s = rest;
            }
        }
        if let Some((&last, rest)) = s.split_last() {
            if last == depot {
                s = rest;
            }
        }
        s
    }

    /// Number of interior stops.
    pub fn len(&self, depot: usize) -> usize {
        self.customers(depot).len()
    }

    /// Returns `true` if the route visits no customer.
    pub fn is_empty(&self, depot: usize) -> bool {
        self.customers(depot).is_empty()
    }

    /// Returns a copy that starts and ends at `depot`.
    pub fn normalized(&self, depot: usize) -> Self {
        Self::from_customers(depot, self.customers(depot))
    }

    /// Sum of consecutive leg distances over the stored stops.
    pub fn cost(&self, distances: &DistanceMatrix) -> f64 {
        self.stops
            .windows(2)
            .map(|w| distances.get(w[0], w[1]))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_customers_adds_depot() {
        let r = Route::from_customers(3, &[1, 2]);
        assert_eq!(r.stops(), &[3, 1, 2, 3]);
        assert_eq!(r.customers(3), &[1, 2]);
    }

    #[test]
    fn test_customers_without_endpoints() {
        let r = Route::new(vec![1, 2]);
        assert_eq!(r.customers(0), &[1, 2]);
        assert_eq!(r.normalized(0).stops(), &[0, 1, 2, 0]);
    }

    #[test]
    fn test_empty_route() {
        let r = Route::from_customers(0, &[]);
        assert!(r.is_empty(0));
        assert_eq!(r.stops(), &[0, 0]);
        assert_eq!(Route::new(vec![0]).len(0), 0);
    }

    #[test]
    fn test_cost() {
        let dm = DistanceMatrix::from_points(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let r = Route::from_customers(0, &[1, 2]);
        assert!((r.cost(&dm) - 4.0).abs() < 1e-10);
    }
}
