//! Travel costs between locations.
//!
//! Costs come from a [`DistanceOracle`] and are memoized per solve by a
//! [`DistanceMatrix`]. The `google-maps` feature adds an oracle backed by
//! the Google Distance Matrix API.

#[cfg(feature = "google-maps")]
mod google;
mod matrix;
mod oracle;

#[cfg(feature = "google-maps")]
pub use google::{GoogleMapsConfig, GoogleMapsConfigError, GoogleMapsOracle};
pub use matrix::DistanceMatrix;
pub use oracle::{DistanceOracle, EuclideanOracle, HaversineOracle};
