//! Edge-selection variables.

use serde::{Deserialize, Serialize};

/// Bijection between directed edges `(i, j)`, `i ≠ j`, and bit indices.
///
/// Bit `i·(D−1) + (j if j < i else j − 1)` selects the edge `i → j`, giving
/// `D·(D−1)` bits in row-major edge order.
///
/// # Examples
///
/// ```
/// use qfleet_routing::qubo::VariableMap;
///
/// let map = VariableMap::new(3);
/// assert_eq!(map.num_bits(), 6);
/// assert_eq!(map.index(0, 1), Some(0));
/// assert_eq!(map.index(1, 0), Some(2));
/// assert_eq!(map.edge(5), Some((2, 1)));
/// assert_eq!(map.index(1, 1), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableMap {
    num_locations: usize,
}

impl VariableMap {
    /// Creates the map for `num_locations` locations.
    pub fn new(num_locations: usize) -> Self {
        Self { num_locations }
    }

    /// Number of locations `D`.
    pub fn num_locations(&self) -> usize {
        self.num_locations
    }

    /// `D·(D−1)`.
    pub fn num_bits(&self) -> usize {
        self.num_locations * self.num_locations.saturating_sub(1)
    }

    /// Bit for edge `from → to`; `None` for self loops or out-of-range ends.
    pub fn index(&self, from: usize, to: usize) -> Option<usize> {
        let d = self.num_locations;
        if from == to || from >= d || to >= d {
            return None;
        }
        let column = if to < from { to } else { to - 1 };
        Some(from * (d - 1) + column)
    }

    /// Edge selected by `bit`.
    pub fn edge(&self, bit: usize) -> Option<(usize, usize)> {
        if bit >= self.num_bits() {
            return None;
        }
        let row_len = self.num_locations - 1;
        let from = bit / row_len;
        let column = bit % row_len;
        let to = if column < from { column } else { column + 1 };
        Some((from, to))
    }

    /// Bits of all edges leaving `from`.
    pub fn outgoing(&self, from: usize) -> Vec<usize> {
        (0..self.num_locations)
            .filter_map(|to| self.index(from, to))
            .collect()
    }

    /// Bits of all edges entering `to`.
    pub fn incoming(&self, to: usize) -> Vec<usize> {
        (0..self.num_locations)
            .filter_map(|from| self.index(from, to))
            .collect()
    }

    /// Bit vector with exactly the given edges set.
    ///
    /// Self loops and out-of-range edges are ignored.
    pub fn encode(&self, edges: &[(usize, usize)]) -> Vec<bool> {
        let mut bits = vec![false; self.num_bits()];
        for &(from, to) in edges {
            if let Some(idx) = self.index(from, to) {
                bits[idx] = true;
            }
        }
        bits
    }

    /// Edges whose bits are set, in bit order.
    pub fn edges_of(&self, bits: &[bool]) -> Vec<(usize, usize)> {
        bits.iter()
            .enumerate()
            .filter(|(_, &set)| set)
            .filter_map(|(idx, _)| self.edge(idx))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_row_major_order() {
        let map = VariableMap::new(4);
        let edges: Vec<_> = (0..map.num_bits()).filter_map(|b| map.edge(b)).collect();
        let expected: Vec<_> = (0..4)
            .flat_map(|i| (0..4).filter(move |&j| j != i).map(move |j| (i, j)))
            .collect();
        assert_eq!(edges, expected);
    }

    #[test]
    fn test_degenerate_sizes() {
        assert_eq!(VariableMap::new(0).num_bits(), 0);
        assert_eq!(VariableMap::new(1).num_bits(), 0);
        assert_eq!(VariableMap::new(1).edge(0), None);
    }

    #[test]
    fn test_outgoing_incoming() {
        let map = VariableMap::new(3);
        assert_eq!(map.outgoing(1), vec![2, 3]);
        assert_eq!(map.incoming(1), vec![0, 5]);
    }

    proptest! {
        #[test]
        fn prop_bijection(d in 2usize..9) {
            let map = VariableMap::new(d);
            prop_assert_eq!(map.num_bits(), d * (d - 1));
            for bit in 0..map.num_bits() {
                let (i, j) = map.edge(bit).expect("in range");
                prop_assert!(i != j);
                prop_assert_eq!(map.index(i, j), Some(bit));
            }
        }

        #[test]
        fn prop_encode_round_trip(d in 2usize..7, mask in any::<u64>()) {
            let map = VariableMap::new(d);
            let edges: Vec<_> = (0..map.num_bits())
                .filter(|b| mask >> (b % 64) & 1 == 1)
                .filter_map(|b| map.edge(b))
                .collect();
            let bits = map.encode(&edges);
            prop_assert_eq!(map.edges_of(&bits), edges);
        }
    }
}
