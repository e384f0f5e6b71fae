//! Bitstring to route decoding with repair.
//!
//! # Algorithm
//!
//! **Extraction.** Set bits form a directed successor list. For each depot
//! successor (ascending) not yet claimed, walk forward for at most `D` steps:
//! an edge back to the depot closes the route; otherwise move to the nearest
//! unclaimed successor; with neither, the walk is abandoned and its customers
//! are released. Only closed routes are kept.
//!
//! **Repair.** Customers missed by extraction go to their cheapest insertion
//! point, or to a new singleton route when that is cheaper and a vehicle is
//! free (or when there are no routes). While there are more routes than
//! vehicles, the two shortest routes that can legally merge are joined in the
//! cheaper of the two concatenation orders.

use tracing::debug;

use crate::distance::DistanceMatrix;
use crate::local_search::{best_insertion, route_distance};
use crate::models::Solution;

use super::variables::VariableMap;

/// Extracts closed depot routes from `bits` as customer sequences.
pub fn extract_routes(
    bits: &[bool],
    map: &VariableMap,
    distances: &DistanceMatrix,
    depot: usize,
) -> Vec<Vec<usize>> {
    let d = map.num_locations();
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); d];
    for (from, to) in map.edges_of(bits) {
        successors[from].push(to);
    }
    if depot >= d {
        return Vec::new();
    }

    let mut claimed = vec![false; d];
    let mut routes = Vec::new();

    for &start in &successors[depot] {
        if start == depot || claimed[start] {
            continue;
        }
        let mut route = vec![start];
        let mut in_route = vec![false; d];
        in_route[start] = true;
        let mut current = start;
        let mut closed = false;

        for _ in 0..d {
            let next = &successors[current];
            if next.contains(&depot) {
                closed = true;
                break;
            }
            let candidates: Vec<usize> = next
                .iter()
                .copied()
                .filter(|&c| !claimed[c] && !in_route[c])
                .collect();
            match distances.nearest_neighbor(current, &candidates) {
                Some(c) => {
                    route.push(c);
                    in_route[c] = true;
                    current = c;
                }
                None => break,
            }
        }

        if closed {
            for &c in &route {
                claimed[c] = true;
            }
            routes.push(route);
        }
    }
    routes
}

/// Inserts missing customers and merges surplus routes.
///
/// `routes` are customer sequences without depot endpoints.
pub fn repair(
    mut routes: Vec<Vec<usize>>,
    distances: &DistanceMatrix,
    depot: usize,
    num_vehicles: usize,
) -> Vec<Vec<usize>> {
    let d = distances.size();
    let mut seen = vec![false; d];
    for &c in routes.iter().flatten() {
        if c < d {
            seen[c] = true;
        }
    }

    let missing: Vec<usize> = (0..d).filter(|&c| c != depot && !seen[c]).collect();
    if !missing.is_empty() {
        debug!(missing = missing.len(), "inserting customers missed by extraction");
    }
    for c in missing {
        let singleton = distances.get(depot, c) + distances.get(c, depot);
        match best_insertion(&routes, c, depot, distances) {
            Some((ri, pos, cost)) if !(singleton < cost && routes.len() < num_vehicles) => {
                routes[ri].insert(pos, c);
            }
            _ => routes.push(vec![c]),
        }
    }

    while routes.len() > num_vehicles {
        if !merge_shortest(&mut routes, distances, depot, d.saturating_sub(1)) {
            debug!(routes = routes.len(), num_vehicles, "no legal merge left");
            break;
        }
    }
    routes
}

/// Merges the shortest legal pair. Returns `false` when no pair can merge.
fn merge_shortest(
    routes: &mut Vec<Vec<usize>>,
    distances: &DistanceMatrix,
    depot: usize,
    max_customers: usize,
) -> bool {
    let mut order: Vec<(usize, f64)> = routes
        .iter()
        .enumerate()
        .map(|(i, r)| (i, route_distance(r, depot, distances)))
        .collect();
    order.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

    for x in 0..order.len() {
        for y in x + 1..order.len() {
            let (a, b) = (order[x].0, order[y].0);
            let (ra, rb) = (&routes[a], &routes[b]);
            if ra.len() + rb.len() > max_customers || ra.iter().any(|c| rb.contains(c)) {
                continue;
            }
            let ab: Vec<usize> = ra.iter().chain(rb).copied().collect();
            let ba: Vec<usize> = rb.iter().chain(ra).copied().collect();
            let merged = if route_distance(&ba, depot, distances) < route_distance(&ab, depot, distances) {
                ba
            } else {
                ab
            };
            let (keep, drop) = (a.min(b), a.max(b));
            routes[keep] = merged;
            routes.remove(drop);
            return true;
        }
    }
    false
}

/// Extraction followed by repair.
///
/// The result is not guaranteed valid: merging can stop early.
///
/// # Examples
///
/// ```
/// use qfleet_routing::distance::DistanceMatrix;
/// use qfleet_routing::qubo::{decode, VariableMap};
///
/// let dm = DistanceMatrix::from_points(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]);
/// let map = VariableMap::new(4);
/// let bits = map.encode(&[(0, 1), (1, 0), (0, 2), (2, 3), (3, 0)]);
/// let solution = decode(&bits, &map, &dm, 0, 2);
/// assert_eq!(solution.sequences(0), vec![vec![1], vec![2, 3]]);
/// ```
pub fn decode(
    bits: &[bool],
    map: &VariableMap,
    distances: &DistanceMatrix,
    depot: usize,
    num_vehicles: usize,
) -> Solution {
    let extracted = extract_routes(bits, map, distances, depot);
    Solution::from_sequences(depot, repair(extracted, distances, depot, num_vehicles))
}
