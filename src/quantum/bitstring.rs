//! Measurement outcomes.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A computational basis state, one `bool` per qubit.
///
/// Qubit `i` is bit `i` of the basis index and character `i` of the
/// rendered string, so the string reads least significant qubit first.
///
/// # Examples
///
/// ```
/// use qfleet_routing::quantum::Bitstring;
///
/// let b = Bitstring::from_index(0b0110, 4);
/// assert_eq!(b.to_string(), "0110");
/// assert_eq!(Bitstring::from_index(1, 3).to_string(), "100");
/// assert_eq!("100".parse::<Bitstring>().expect("binary"), Bitstring::from_index(1, 3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bitstring(Vec<bool>);

impl Bitstring {
    /// Wraps explicit bits.
    pub fn new(bits: Vec<bool>) -> Self {
        Self(bits)
    }

    /// The `num_qubits`-bit state for basis `index`.
    pub fn from_index(index: usize, num_qubits: usize) -> Self {
        Self(
            (0..num_qubits)
                .map(|i| i < usize::BITS as usize && (index >> i) & 1 == 1)
                .collect(),
        )
    }

    pub fn as_bits(&self) -> &[bool] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }
}

/// Orders by basis index: shorter strings first, then from the most
/// significant qubit down.
impl Ord for Bitstring {
    fn cmp(&self, other: &Self) -> Ordering {
        self.len()
            .cmp(&other.len())
            .then_with(|| self.0.iter().rev().cmp(other.0.iter().rev()))
    }
}

impl PartialOrd for Bitstring {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Bitstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.0 {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// A character other than `0` or `1`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid bitstring character '{0}'")]
pub struct ParseBitstringError(pub char);

impl FromStr for Bitstring {
    type Err = ParseBitstringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(ParseBitstringError(other)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

/// A sampled bitstring and how many shots produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    pub bitstring: Bitstring,
    pub count: usize,
}
