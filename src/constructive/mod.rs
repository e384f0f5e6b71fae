//! Constructive heuristics for building VRP solutions.
//!
//! - [`nearest_neighbor`] — Greedy nearest-neighbor with an even fleet split, O(n²)
//! - [`singleton_routes`] — One customer per route, the emergency fallback

mod nearest_neighbor;

pub use nearest_neighbor::{
    nearest_neighbor, singleton_routes, NearestNeighborSolver, OVERFLOW_ROUTE_LEN,
};
