//! Distance matrices.
//!
//! Provides a dense distance matrix with Euclidean and great-circle
//! builders. Road-network distances are computed elsewhere and passed in
//! through [`DistanceMatrix::from_rows`] or [`DistanceMatrix::from_data`].

mod matrix;

pub use matrix::{DistanceMatrix, EARTH_RADIUS_KM};
