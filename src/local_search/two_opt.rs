//! Intra-route 2-opt improvement.
//!
//! # Algorithm
//!
//! For each pair of positions (i, j) in a route, compute the change in
//! distance from reversing the segment between them:
//!
//! ```text
//! delta = d(prev_i, r[j]) + d(r[i], next_j) - d(prev_i, r[i]) - d(r[j], next_j)
//! ```
//!
//! If delta < 0, reverse `r[i..=j]` and accept the improvement. Repeat until
//! no further improvements are found (first-improvement strategy).
//!
//! The delta assumes a symmetric matrix. On asymmetric input the final
//! distance is recomputed from scratch, so the reported cost stays exact.
//!
//! # Complexity
//!
//! O(n²) per pass, O(n³) worst case for convergence.
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.

use crate::distance::DistanceMatrix;

/// Applies 2-opt improvement to a single route (given as a sequence of customer IDs).
///
/// The route is assumed to start and end at `depot`. Returns the improved
/// customer sequence and the total route distance.
///
/// # Examples
///
/// ```
/// use qfleet_routing::distance::DistanceMatrix;
/// use qfleet_routing::local_search::two_opt_improve;
///
/// let dm = DistanceMatrix::from_points(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (1.0, -1.0)]);
/// // 1 → 3 → 2 crosses itself
/// let (_, dist) = two_opt_improve(&[1, 3, 2], 0, &dm);
/// assert!(dist <= 4.0 * 2f64.sqrt() + 1e-10);
/// ```
pub fn two_opt_improve(
    route: &[usize],
    depot: usize,
    distances: &DistanceMatrix,
) -> (Vec<usize>, f64) {
    if route.len() < 2 {
        return (route.to_vec(), route_distance(route, depot, distances));
    }

    let mut current = route.to_vec();
    let mut improved = true;

    while improved {
        improved = false;
        let n = current.len();

        for i in 0..n - 1 {
            for j in i + 1..n {
                if two_opt_delta(&current, depot, distances, i, j) < -1e-10 {
                    current[i..=j].reverse();
                    improved = true;
                }
            }
        }
    }

    let dist = route_distance(&current, depot, distances);
    (current, dist)
}

/// Reverses `route[i..=j]` in place. Used as a random neighborhood move.
pub fn two_opt_move(route: &mut [usize], i: usize, j: usize) {
    let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
    route[lo..=hi].reverse();
}

/// Distance change from reversing `route[i..=j]`.
fn two_opt_delta(
    route: &[usize],
    depot: usize,
    distances: &DistanceMatrix,
    i: usize,
    j: usize,
) -> f64 {
    let n = route.len();
    let prev_i = if i == 0 { depot } else { route[i - 1] };
    let next_j = if j == n - 1 { depot } else { route[j + 1] };

    let old_cost = distances.get(prev_i, route[i]) + distances.get(route[j], next_j);
    let new_cost = distances.get(prev_i, route[j]) + distances.get(route[i], next_j);

    new_cost - old_cost
}

/// Computes the total distance of a route: `depot → route[0] → ... → route[n-1] → depot`.
///
/// An empty route costs `0.0`.
pub fn route_distance(route: &[usize], depot: usize, distances: &DistanceMatrix) -> f64 {
    let (Some(&first), Some(&last)) = (route.first(), route.last()) else {
        return 0.0;
    };
    let mut dist = distances.get(depot, first);
    for w in route.windows(2) {
        dist += distances.get(w[0], w[1]);
    }
    dist + distances.get(last, depot)
}
