//! Cheapest insertion.
//!
//! Shared by the decoder repair step and the annealing relocate move.
//! Routes are customer sequences without depot endpoints.

use crate::distance::DistanceMatrix;

/// Cost of inserting `customer` at `pos` in `route`.
pub fn insertion_cost(
    route: &[usize],
    pos: usize,
    customer: usize,
    depot: usize,
    distances: &DistanceMatrix,
) -> f64 {
    let prev = if pos == 0 { depot } else { route[pos - 1] };
    let next = if pos == route.len() { depot } else { route[pos] };

    distances.get(prev, customer) + distances.get(customer, next) - distances.get(prev, next)
}

/// Cost change from removing the customer at `pos` (negative when it saves distance).
pub fn removal_cost(route: &[usize], pos: usize, depot: usize, distances: &DistanceMatrix) -> f64 {
    let prev = if pos == 0 { depot } else { route[pos - 1] };
    let next = if pos == route.len() - 1 {
        depot
    } else {
        route[pos + 1]
    };
    let cid = route[pos];

    distances.get(prev, next) - distances.get(prev, cid) - distances.get(cid, next)
}

/// Cheapest insertion position for `customer` in a single route.
///
/// Returns `(position, cost_increase)`. An empty route yields position 0
/// with the out-and-back cost.
pub fn best_position(
    route: &[usize],
    customer: usize,
    depot: usize,
    distances: &DistanceMatrix,
) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for pos in 0..=route.len() {
        let cost = insertion_cost(route, pos, customer, depot, distances);
        if cost < best.1 {
            best = (pos, cost);
        }
    }
    best
}

/// Finds the best insertion position for a customer across all routes.
///
/// Returns `(route_index, position, cost_increase)`, or `None` when there
/// are no routes.
///
/// # Examples
///
/// ```
/// use qfleet_routing::distance::DistanceMatrix;
/// use qfleet_routing::local_search::best_insertion;
///
/// let dm = DistanceMatrix::from_points(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 5.0)]);
/// let routes = vec![vec![1], vec![3]];
/// let (ri, _pos, cost) = best_insertion(&routes, 2, 0, &dm).expect("routes exist");
/// assert_eq!(ri, 0);
/// assert!((cost - 2.0).abs() < 1e-10);
/// ```
pub fn best_insertion(
    routes: &[Vec<usize>],
    customer: usize,
    depot: usize,
    distances: &DistanceMatrix,
) -> Option<(usize, usize, f64)> {
    let mut best: Option<(usize, usize, f64)> = None;

    for (ri, route) in routes.iter().enumerate() {
        let (pos, cost) = best_position(route, customer, depot, distances);
        if best.as_ref().is_none_or(|b| cost < b.2) {
            best = Some((ri, pos, cost));
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> DistanceMatrix {
        DistanceMatrix::from_points(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)])
    }

    #[test]
    fn test_insertion_cost_between() {
        let dm = line();
        // 0 → 1 → 3 → 0, insert 2 between 1 and 3: 1 + 1 - 2 = 0
        assert!(insertion_cost(&[1, 3], 1, 2, 0, &dm).abs() < 1e-10);
    }

    #[test]
    fn test_removal_cost() {
        let dm = line();
        // Removing 3 from [1, 2, 3]: 2→0 replaces 2→3→0, saves 1 + 3 - 2 = 2
        assert!((removal_cost(&[1, 2, 3], 2, 0, &dm) + 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_best_position_empty_route() {
        let dm = line();
        let (pos, cost) = best_position(&[], 2, 0, &dm);
        assert_eq!(pos, 0);
        assert!((cost - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_best_insertion_none_without_routes() {
        let dm = line();
        assert!(best_insertion(&[], 1, 0, &dm).is_none());
    }

    #[test]
    fn test_best_insertion_picks_cheapest_route() {
        let dm = line();
        let routes = vec![vec![3], vec![1]];
        let (ri, _, cost) = best_insertion(&routes, 2, 0, &dm).expect("routes exist");
        assert_eq!(ri, 0);
        assert!(cost.abs() < 1e-10);
    }
}
