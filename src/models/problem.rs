//! Problem instance.

use serde::{Deserialize, Serialize};

use crate::distance::DistanceMatrix;
use crate::error::VrpError;

/// Tolerance for a non-zero diagonal entry.
const DIAGONAL_TOL: f64 = 1e-9;

/// A validated vehicle routing instance: distances, fleet size and depot.
///
/// Every location other than the depot is a customer that must be visited
/// exactly once. The matrix is expected to be symmetric but this is not
/// enforced.
///
/// # Examples
///
/// ```
/// use qfleet_routing::models::Problem;
///
/// let problem = Problem::from_points(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)], 2, 0)
///     .expect("valid");
/// assert_eq!(problem.customers(), vec![1, 2]);
/// assert_eq!(problem.num_vehicles(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    distances: DistanceMatrix,
    num_vehicles: usize,
    depot: usize,
}

impl Problem {
    /// Creates a problem after checking the matrix, depot and fleet size.
    ///
    /// # Errors
    ///
    /// Returns [`VrpError::InvalidProblem`] for an empty matrix, an
    /// out-of-range depot, zero vehicles, a negative or non-finite distance,
    /// or a non-zero diagonal.
    pub fn new(
        distances: DistanceMatrix,
        num_vehicles: usize,
        depot: usize,
    ) -> Result<Self, VrpError> {
        let n = distances.size();
        if n == 0 {
            return Err(VrpError::InvalidProblem("distance matrix is empty".into()));
        }
        if depot >= n {
            return Err(VrpError::InvalidProblem(format!(
                "depot index {depot} out of range for {n} locations"
            )));
        }
        if num_vehicles == 0 {
            return Err(VrpError::InvalidProblem(
                "at least one vehicle is required".into(),
            ));
        }
        for i in 0..n {
            for j in 0..n {
                let d = distances.get(i, j);
                if !d.is_finite() || d < 0.0 {
                    return Err(VrpError::InvalidProblem(format!(
                        "distance ({i}, {j}) = {d} must be finite and non-negative"
                    )));
                }
            }
            if distances.get(i, i).abs() > DIAGONAL_TOL {
                return Err(VrpError::InvalidProblem(format!(
                    "diagonal entry ({i}, {i}) must be zero"
                )));
            }
        }
        Ok(Self {
            distances,
            num_vehicles,
            depot,
        })
    }

    /// Builds a problem from planar points using Euclidean distances.
    pub fn from_points(
        points: &[(f64, f64)],
        num_vehicles: usize,
        depot: usize,
    ) -> Result<Self, VrpError> {
        Self::new(DistanceMatrix::from_points(points), num_vehicles, depot)
    }

    /// Builds a problem from `(lat, lon)` coordinates using haversine distances.
    pub fn from_coordinates(
        coords: &[(f64, f64)],
        num_vehicles: usize,
        depot: usize,
    ) -> Result<Self, VrpError> {
        Self::new(DistanceMatrix::from_coordinates(coords), num_vehicles, depot)
    }

    /// The distance matrix.
    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// Fleet size.
    pub fn num_vehicles(&self) -> usize {
        self.num_vehicles
    }

    /// Depot location index.
    pub fn depot(&self) -> usize {
        self.depot
    }

    /// Total number of locations including the depot.
    pub fn num_locations(&self) -> usize {
        self.distances.size()
    }

    /// Number of customers (locations other than the depot).
    pub fn num_customers(&self) -> usize {
        self.distances.size() - 1
    }

    /// Customer indices in ascending order.
    pub fn customers(&self) -> Vec<usize> {
        (0..self.distances.size())
            .filter(|&i| i != self.depot)
            .collect()
    }
}
