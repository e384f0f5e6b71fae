//! Solver output types.

use serde::{Deserialize, Serialize};

use super::Solution;

/// Which tier of the quantum pipeline produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionTier {
    /// Decoded from the optimized circuit.
    Quantum,
    /// Produced by the classical fallback solver.
    Fallback,
    /// Produced by the singleton-route emergency construction.
    Emergency,
}

/// Diagnostics reported by the QAOA orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaoaDiagnostics {
    /// Number of QUBO variables.
    pub num_qubits: usize,
    /// Circuit depth `p`.
    pub layers: usize,
    /// Shots per sampling call.
    pub shots: usize,
    /// Name reported by the parameter optimizer.
    pub optimizer: String,
    /// Objective evaluations spent by the optimizer.
    pub evaluations: usize,
    /// Best expectation value found, if optimization completed.
    pub best_energy: Option<f64>,
    /// Optimized `[γ.., β..]`, if optimization completed.
    pub best_params: Vec<f64>,
    /// The bitstring the decoded routes came from.
    pub bitstring: Option<String>,
    /// Penalty weight used in the cost model.
    pub penalty_strength: f64,
    /// Whether the penalty exceeds the objective upper bound.
    pub penalty_dominates: bool,
    /// Tier that produced the solution.
    pub tier: ExecutionTier,
    /// Why the quantum tier was abandoned.
    pub fallback_reason: Option<String>,
}

/// Algorithm-specific diagnostics attached to a [`SolveResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Diagnostics {
    /// Nearest-neighbor construction.
    NearestNeighbor {
        /// Routes opened, including overflow routes.
        routes_used: usize,
    },
    /// Genetic algorithm.
    Genetic {
        /// Generations evolved.
        generations: usize,
        /// Population size.
        population_size: usize,
        /// `1 / (1 + cost)` of the best individual.
        best_fitness: f64,
    },
    /// Simulated annealing.
    Annealing {
        /// Iterations consumed, including rejected neighbor draws.
        iterations: usize,
        /// Temperature at termination.
        final_temperature: f64,
        /// Accepted moves.
        accepted_moves: usize,
    },
    /// Branch and bound.
    BranchAndBound {
        /// Whether the instance is small enough for exhaustive search.
        is_optimal: bool,
        /// Whether the time budget fired before the search completed.
        timed_out: bool,
        /// Search nodes expanded.
        nodes_explored: u64,
    },
    /// QAOA pipeline.
    Qaoa(QaoaDiagnostics),
}

/// Outcome of a single solver run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResult {
    /// The routes.
    pub solution: Solution,
    /// Sum of route costs.
    pub total_cost: f64,
    /// Wall-clock time in seconds.
    pub execution_time: f64,
    /// Algorithm name, suffixed when a fallback tier produced the result.
    pub algorithm: String,
    /// Every customer visited exactly once.
    pub is_valid: bool,
    /// Algorithm-specific details.
    pub diagnostics: Diagnostics,
}
