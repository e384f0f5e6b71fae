//! Exact search for tiny instances.

mod branch_and_bound;

pub use branch_and_bound::{
    exhaustive_search, BnbConfig, BranchAndBoundSolver, SearchOutcome, MAX_EXACT_CUSTOMERS,
};
