//! Visit-order chromosome.
//!
//! The chromosome is a permutation of customer *ranks* `0..n`, where rank
//! `r` stands for the r-th customer in ascending index order. Working on
//! ranks lets the `u-metaheur` permutation operators run unchanged whatever
//! index the depot has.

use u_metaheur::ga::Individual;

/// A permutation of customer ranks that encodes one visiting order.
///
/// Lower fitness = lower total distance.
///
/// # Examples
///
/// ```
/// use qfleet_routing::ga::VisitOrder;
/// use u_metaheur::ga::Individual;
///
/// let order = VisitOrder::new(vec![2, 0, 1]);
/// // customers 1, 2, 3 with the depot at 0
/// assert_eq!(order.to_customers(&[1, 2, 3]), vec![3, 1, 2]);
/// assert_eq!(order.fitness(), f64::INFINITY);
/// ```
#[derive(Debug, Clone)]
pub struct VisitOrder {
    ranks: Vec<usize>,
    fitness: f64,
}

impl VisitOrder {
    /// Creates a chromosome from a rank permutation.
    pub fn new(ranks: Vec<usize>) -> Self {
        Self {
            ranks,
            fitness: f64::INFINITY,
        }
    }

    /// Rank permutation.
    pub fn ranks(&self) -> &[usize] {
        &self.ranks
    }

    /// Mutable rank permutation for in-place operators.
    pub fn ranks_mut(&mut self) -> &mut Vec<usize> {
        &mut self.ranks
    }

    /// Maps ranks back to customer indices.
    pub fn to_customers(&self, customers: &[usize]) -> Vec<usize> {
        self.ranks.iter().map(|&r| customers[r]).collect()
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Returns `true` for the zero-customer chromosome.
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

impl Individual for VisitOrder {
    type Fitness = f64;

    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}
