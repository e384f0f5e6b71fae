//! Neighborhood moves for simulated annealing.
//!
//! Every move keeps the set of visited customers intact and never empties a
//! route, so a neighbor always uses the same number of vehicles as its
//! parent. A move that cannot apply to the current solution yields `None`.

use rand::Rng;

use crate::distance::DistanceMatrix;
use crate::local_search::{best_position, two_opt_move};

/// The three move operators, drawn uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Exchange two customers that sit on different routes.
    Swap,
    /// Move one customer to the cheapest position of another route.
    Relocate,
    /// Reverse a segment inside one route.
    TwoOpt,
}

impl Move {
    /// Draws a move uniformly.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        match rng.random_range(0..3u8) {
            0 => Move::Swap,
            1 => Move::Relocate,
            _ => Move::TwoOpt,
        }
    }

    /// Applies the move to a copy of `routes`.
    pub fn apply<R: Rng>(
        self,
        routes: &[Vec<usize>],
        depot: usize,
        distances: &DistanceMatrix,
        rng: &mut R,
    ) -> Option<Vec<Vec<usize>>> {
        match self {
            Move::Swap => swap(routes, rng),
            Move::Relocate => relocate(routes, depot, distances, rng),
            Move::TwoOpt => two_opt(routes, rng),
        }
    }
}

/// Draws a move and applies it.
pub fn random_neighbor<R: Rng>(
    routes: &[Vec<usize>],
    depot: usize,
    distances: &DistanceMatrix,
    rng: &mut R,
) -> Option<Vec<Vec<usize>>> {
    Move::random(rng).apply(routes, depot, distances, rng)
}

fn distinct_pair<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let a = rng.random_range(0..n);
    let mut b = rng.random_range(0..n - 1);
    if b >= a {
        b += 1;
    }
    (a, b)
}

fn swap<R: Rng>(routes: &[Vec<usize>], rng: &mut R) -> Option<Vec<Vec<usize>>> {
    if routes.len() < 2 {
        return None;
    }
    let (r1, r2) = distinct_pair(routes.len(), rng);
    if routes[r1].is_empty() || routes[r2].is_empty() {
        return None;
    }
    let p1 = rng.random_range(0..routes[r1].len());
    let p2 = rng.random_range(0..routes[r2].len());

    let mut next = routes.to_vec();
    let tmp = next[r1][p1];
    next[r1][p1] = next[r2][p2];
    next[r2][p2] = tmp;
    Some(next)
}

fn relocate<R: Rng>(
    routes: &[Vec<usize>],
    depot: usize,
    distances: &DistanceMatrix,
    rng: &mut R,
) -> Option<Vec<Vec<usize>>> {
    if routes.len() < 2 {
        return None;
    }
    let (from, to) = distinct_pair(routes.len(), rng);
    if routes[from].len() < 2 {
        return None;
    }
    let pos = rng.random_range(0..routes[from].len());

    let mut next = routes.to_vec();
    let customer = next[from].remove(pos);
    let (insert_at, _) = best_position(&next[to], customer, depot, distances);
    next[to].insert(insert_at, customer);
    Some(next)
}

fn two_opt<R: Rng>(routes: &[Vec<usize>], rng: &mut R) -> Option<Vec<Vec<usize>>> {
    let eligible: Vec<usize> = routes
        .iter()
        .enumerate()
        .filter(|(_, r)| r.len() >= 2)
        .map(|(i, _)| i)
        .collect();
    if eligible.is_empty() {
        return None;
    }
    let ri = eligible[rng.random_range(0..eligible.len())];
    let (i, j) = distinct_pair(routes[ri].len(), rng);

    let mut next = routes.to_vec();
    two_opt_move(&mut next[ri], i, j);
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use u_numflow::random::create_rng;

    fn line() -> DistanceMatrix {
        DistanceMatrix::from_points(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)])
    }

    fn sorted_customers(routes: &[Vec<usize>]) -> Vec<usize> {
        let mut all: Vec<usize> = routes.iter().flatten().copied().collect();
        all.sort_unstable();
        all
    }

    #[test]
    fn test_moves_preserve_customers_and_route_count() {
        let dm = line();
        let routes = vec![vec![1, 2], vec![3, 4]];
        let mut rng = create_rng(5);
        for _ in 0..200 {
            if let Some(next) = random_neighbor(&routes, 0, &dm, &mut rng) {
                assert_eq!(sorted_customers(&next), vec![1, 2, 3, 4]);
                assert_eq!(next.len(), 2);
                assert!(next.iter().all(|r| !r.is_empty()));
            }
        }
    }

    #[test]
    fn test_single_route_has_no_inter_route_moves() {
        let dm = line();
        let routes = vec![vec![1, 2, 3]];
        let mut rng = create_rng(1);
        assert!(Move::Swap.apply(&routes, 0, &dm, &mut rng).is_none());
        assert!(Move::Relocate.apply(&routes, 0, &dm, &mut rng).is_none());
        assert!(Move::TwoOpt.apply(&routes, 0, &dm, &mut rng).is_some());
    }

    #[test]
    fn test_relocate_never_empties_route() {
        let dm = line();
        let routes = vec![vec![1], vec![2]];
        let mut rng = create_rng(9);
        for _ in 0..50 {
            assert!(Move::Relocate.apply(&routes, 0, &dm, &mut rng).is_none());
        }
    }

    #[test]
    fn test_two_opt_needs_two_customers() {
        let dm = line();
        let routes = vec![vec![1], vec![2]];
        let mut rng = create_rng(2);
        assert!(Move::TwoOpt.apply(&routes, 0, &dm, &mut rng).is_none());
    }

    #[test]
    fn test_swap_crosses_routes() {
        let dm = line();
        let routes = vec![vec![1], vec![2]];
        let mut rng = create_rng(3);
        let next = Move::Swap.apply(&routes, 0, &dm, &mut rng).expect("applies");
        assert_eq!(next, vec![vec![2], vec![1]]);
    }
}
