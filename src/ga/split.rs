//! Contiguous split of a visiting order into routes.
//!
//! # Algorithm
//!
//! With `n` customers and `k = min(V, n)` routes, each route receives
//! `n / k` consecutive customers and the first `n mod k` routes receive one
//! extra. Every route is non-empty and the fleet is never exceeded.
//!
//! # Complexity
//!
//! O(n).

/// Splits `sequence` into `min(num_routes, len)` contiguous non-empty routes.
///
/// Returns no routes for an empty sequence or `num_routes == 0`.
///
/// # Examples
///
/// ```
/// use qfleet_routing::ga::split_even;
///
/// let routes = split_even(&[5, 4, 3, 2, 1], 2);
/// assert_eq!(routes, vec![vec![5, 4, 3], vec![2, 1]]);
/// ```
pub fn split_even(sequence: &[usize], num_routes: usize) -> Vec<Vec<usize>> {
    let n = sequence.len();
    let k = num_routes.min(n);
    if k == 0 {
        return Vec::new();
    }
    let base = n / k;
    let extra = n % k;

    let mut routes = Vec::with_capacity(k);
    let mut start = 0;
    for i in 0..k {
        let len = base + usize::from(i < extra);
        routes.push(sequence[start..start + len].to_vec());
        start += len;
    }
    routes
}
