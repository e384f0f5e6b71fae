//! GA problem definition for vehicle routing.
//!
//! Implements the [`GaProblem`](u_metaheur::ga::GaProblem) trait over a
//! [`VisitOrder`] chromosome. Evaluation splits the order contiguously across
//! the fleet and sums the route distances.
//!
//! # Operators
//!
//! - **Crossover**: Order crossover (OX), preserves relative customer ordering
//! - **Mutation**: Swap of two positions
//! - **Evaluation**: Even split → optional intra-route 2-opt → total distance

use rand::Rng;
use u_metaheur::ga::operators::{order_crossover, swap_mutation};
use u_metaheur::ga::GaProblem;

use crate::distance::DistanceMatrix;
use crate::local_search::{route_distance, two_opt_improve};
use crate::models::Problem;

use super::chromosome::VisitOrder;
use super::split::split_even;

/// GA problem for fleet-split vehicle routing.
///
/// # Examples
///
/// ```
/// use qfleet_routing::models::Problem;
/// use qfleet_routing::ga::VrpGaProblem;
/// use u_metaheur::ga::{GaConfig, GaRunner};
///
/// let problem = Problem::from_points(
///     &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)], 1, 0,
/// ).expect("valid");
/// let ga = VrpGaProblem::new(&problem);
/// let config = GaConfig::default()
///     .with_population_size(20)
///     .with_max_generations(30)
///     .with_seed(7);
///
/// let result = GaRunner::run(&ga, &config).expect("valid config");
/// assert!((result.best_fitness - 6.0).abs() < 1e-10);
/// ```
pub struct VrpGaProblem {
    customers: Vec<usize>,
    depot: usize,
    num_vehicles: usize,
    distances: DistanceMatrix,
    apply_local_search: bool,
}

impl VrpGaProblem {
    /// Creates a GA problem from a routing instance.
    pub fn new(problem: &Problem) -> Self {
        Self {
            customers: problem.customers(),
            depot: problem.depot(),
            num_vehicles: problem.num_vehicles(),
            distances: problem.distances().clone(),
            apply_local_search: false,
        }
    }

    /// Enables intra-route 2-opt during evaluation and decoding.
    pub fn with_local_search(mut self, enabled: bool) -> Self {
        self.apply_local_search = enabled;
        self
    }

    /// Number of customers (genes per chromosome).
    pub fn num_customers(&self) -> usize {
        self.customers.len()
    }

    /// Turns a chromosome into customer sequences, one per route.
    pub fn decode(&self, individual: &VisitOrder) -> Vec<Vec<usize>> {
        let order = individual.to_customers(&self.customers);
        let routes = split_even(&order, self.num_vehicles);
        if !self.apply_local_search {
            return routes;
        }
        routes
            .into_iter()
            .map(|r| two_opt_improve(&r, self.depot, &self.distances).0)
            .collect()
    }

    /// Total distance of a set of customer sequences.
    pub fn cost_of(&self, routes: &[Vec<usize>]) -> f64 {
        routes
            .iter()
            .map(|r| route_distance(r, self.depot, &self.distances))
            .sum()
    }
}

impl GaProblem for VrpGaProblem {
    type Individual = VisitOrder;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> VisitOrder {
        let mut perm: Vec<usize> = (0..self.num_customers()).collect();

        // Fisher-Yates shuffle
        for i in (1..perm.len()).rev() {
            let j = rng.random_range(0..=i);
            perm.swap(i, j);
        }

        VisitOrder::new(perm)
    }

    fn evaluate(&self, individual: &VisitOrder) -> f64 {
        self.cost_of(&self.decode(individual))
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &VisitOrder,
        parent2: &VisitOrder,
        rng: &mut R,
    ) -> Vec<VisitOrder> {
        if parent1.is_empty() {
            return vec![parent1.clone()];
        }
        let (c1, c2) = order_crossover(parent1.ranks(), parent2.ranks(), rng);
        vec![VisitOrder::new(c1), VisitOrder::new(c2)]
    }

    fn mutate<R: Rng>(&self, individual: &mut VisitOrder, rng: &mut R) {
        swap_mutation(individual.ranks_mut(), rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use u_metaheur::ga::{GaConfig, GaRunner};

    fn setup(vehicles: usize) -> Problem {
        Problem::from_points(
            &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)],
            vehicles,
            0,
        )
        .expect("valid")
    }

    #[test]
    fn test_create_individual() {
        let problem = VrpGaProblem::new(&setup(1));
        let mut rng = u_numflow::random::create_rng(42);
        let ind = problem.create_individual(&mut rng);
        let mut sorted = ind.ranks().to_vec();
        sorted.sort();
        assert_eq!(sorted, vec![0, 1, 2]);
    }

    #[test]
    fn test_evaluate_optimal_tour() {
        let problem = VrpGaProblem::new(&setup(1));
        let tour = VisitOrder::new(vec![0, 1, 2]);
        // 0→1→2→3→0 = 6.0
        assert!((problem.evaluate(&tour) - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_evaluate_splits_across_fleet() {
        let problem = VrpGaProblem::new(&setup(2));
        let tour = VisitOrder::new(vec![0, 1, 2]);
        // [1, 2] = 4, [3] = 6
        assert!((problem.evaluate(&tour) - 10.0).abs() < 1e-10);
        assert_eq!(problem.decode(&tour), vec![vec![1, 2], vec![3]]);
    }

    #[test]
    fn test_local_search_never_worse() {
        let plain = VrpGaProblem::new(&setup(1));
        let polished = VrpGaProblem::new(&setup(1)).with_local_search(true);
        let tour = VisitOrder::new(vec![2, 0, 1]);
        assert!(polished.evaluate(&tour) <= plain.evaluate(&tour) + 1e-10);
    }

    #[test]
    fn test_crossover_preserves_genes() {
        let problem = VrpGaProblem::new(&setup(1));
        let p1 = VisitOrder::new(vec![0, 1, 2]);
        let p2 = VisitOrder::new(vec![2, 0, 1]);
        let mut rng = u_numflow::random::create_rng(42);
        let children = problem.crossover(&p1, &p2, &mut rng);
        assert_eq!(children.len(), 2);
        for child in &children {
            let mut sorted = child.ranks().to_vec();
            sorted.sort();
            assert_eq!(sorted, vec![0, 1, 2]);
        }
    }

    #[test]
    fn test_crossover_empty_chromosome() {
        let problem = VrpGaProblem::new(&setup(1));
        let empty = VisitOrder::new(vec![]);
        let mut rng = u_numflow::random::create_rng(1);
        assert_eq!(problem.crossover(&empty, &empty, &mut rng).len(), 1);
    }

    #[test]
    fn test_mutate_preserves_genes() {
        let problem = VrpGaProblem::new(&setup(1));
        let mut tour = VisitOrder::new(vec![0, 1, 2]);
        let mut rng = u_numflow::random::create_rng(42);
        problem.mutate(&mut tour, &mut rng);
        let mut sorted = tour.ranks().to_vec();
        sorted.sort();
        assert_eq!(sorted, vec![0, 1, 2]);
    }

    #[test]
    fn test_ga_runner_finds_solution() {
        let problem = VrpGaProblem::new(&setup(1));
        let config = GaConfig::default()
            .with_population_size(20)
            .with_max_generations(30)
            .with_seed(3);

        let result = GaRunner::run(&problem, &config).expect("valid config");
        assert!((result.best_fitness - 6.0).abs() < 1e-10);
    }
}
