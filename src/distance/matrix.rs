//! Dense distance matrix.

use serde::{Deserialize, Serialize};

use crate::error::VrpError;

/// Mean Earth radius in kilometres used by [`DistanceMatrix::from_coordinates`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A dense n×n distance matrix stored in row-major order.
///
/// Location indices are positions in the input list. One of them is the
/// depot; the matrix itself does not care which.
///
/// # Examples
///
/// ```
/// use qfleet_routing::distance::DistanceMatrix;
///
/// let dm = DistanceMatrix::from_points(&[(0.0, 0.0), (3.0, 4.0), (6.0, 8.0)]);
/// assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
/// assert_eq!(dm.size(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a distance matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Computes a Euclidean distance matrix from planar `(x, y)` points.
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        let n = points.len();
        let mut dm = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let (dx, dy) = (points[i].0 - points[j].0, points[i].1 - points[j].1);
                let d = (dx * dx + dy * dy).sqrt();
                dm.set(i, j, d);
                dm.set(j, i, d);
            }
        }
        dm
    }

    /// Computes great-circle distances in kilometres from `(lat, lon)` pairs
    /// given in degrees.
    ///
    /// # Examples
    ///
    /// ```
    /// use qfleet_routing::distance::DistanceMatrix;
    ///
    /// // One degree of latitude is about 111.19 km.
    /// let dm = DistanceMatrix::from_coordinates(&[(0.0, 0.0), (1.0, 0.0)]);
    /// assert!((dm.get(0, 1) - 111.19).abs() < 0.01);
    /// ```
    pub fn from_coordinates(coords: &[(f64, f64)]) -> Self {
        let n = coords.len();
        let mut dm = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = haversine_km(coords[i], coords[j]);
                dm.set(i, j, d);
                dm.set(j, i, d);
            }
        }
        dm
    }

    /// Creates a distance matrix from an explicit row-major n×n grid.
    ///
    /// Returns `None` if the data length doesn't match `size * size`.
    pub fn from_data(size: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != size * size {
            return None;
        }
        Some(Self { data, size })
    }

    /// Creates a distance matrix from nested rows.
    ///
    /// # Errors
    ///
    /// Returns [`VrpError::InvalidProblem`] if any row length differs from
    /// the number of rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, VrpError> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != size {
                return Err(VrpError::InvalidProblem(format!(
                    "distance matrix is not square: row {i} has {} entries, expected {size}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self { data, size })
    }

    /// Returns the distance from location `from` to location `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the distance from location `from` to location `to`.
    pub fn set(&mut self, from: usize, to: usize, distance: f64) {
        self.data[from * self.size + to] = distance;
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Row-major backing data.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Largest entry, or `0.0` for an empty matrix.
    pub fn max_distance(&self) -> f64 {
        self.data.iter().copied().fold(0.0, f64::max)
    }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Returns the nearest neighbor of `from` among the given candidates.
    ///
    /// Ties go to the candidate listed first. Returns `None` if
    /// `candidates` is empty.
    pub fn nearest_neighbor(&self, from: usize, candidates: &[usize]) -> Option<usize> {
        candidates
            .iter()
            .copied()
            .min_by(|&a, &b| self.get(from, a).total_cmp(&self.get(from, b)))
    }
}

fn haversine_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}
