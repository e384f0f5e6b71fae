//! Route-level operators shared by the solvers and the decoder.
//!
//! - [`two_opt`](two_opt_improve) — Intra-route 2-opt edge reversal
//! - [`insertion`](best_insertion) — Cheapest insertion across routes

mod insertion;
mod two_opt;

pub use insertion::{best_insertion, best_position, insertion_cost, removal_cost};
pub use two_opt::{route_distance, two_opt_improve, two_opt_move};
