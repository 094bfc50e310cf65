//! Distance oracle trait and built-in oracles.

use crate::error::OracleError;
use crate::models::Coordinate;

/// Mean earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// External source of travel cost between two coordinates.
///
/// The engine treats the returned value as an opaque, non-negative cost and
/// never fabricates one when the oracle fails. Implementations must be
/// idempotent and side-effect free so the matrix may query them from
/// several threads.
///
/// Closures with the matching signature implement the trait, which makes
/// stub oracles short to write.
///
/// # Examples
///
/// ```
/// use u_cvrp::distance::DistanceOracle;
/// use u_cvrp::error::OracleError;
/// use u_cvrp::models::Coordinate;
///
/// let manhattan = |a: Coordinate, b: Coordinate| -> Result<f64, OracleError> {
///     Ok((a.x - b.x).abs() + (a.y - b.y).abs())
/// };
/// let d = manhattan
///     .fetch_distance(Coordinate::new(0.0, 0.0), Coordinate::new(2.0, 3.0))
///     .unwrap();
/// assert_eq!(d, 5.0);
/// ```
pub trait DistanceOracle: Send + Sync {
    /// Travel cost from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns an [`OracleError`] if the source is unreachable or its
    /// answer cannot be interpreted.
    fn fetch_distance(&self, from: Coordinate, to: Coordinate) -> Result<f64, OracleError>;
}

impl<F> DistanceOracle for F
where
    F: Fn(Coordinate, Coordinate) -> Result<f64, OracleError> + Send + Sync,
{
    fn fetch_distance(&self, from: Coordinate, to: Coordinate) -> Result<f64, OracleError> {
        self(from, to)
    }
}

/// Straight-line distance in coordinate units, multiplied by a scale.
///
/// # Examples
///
/// ```
/// use u_cvrp::distance::{DistanceOracle, EuclideanOracle};
/// use u_cvrp::models::Coordinate;
///
/// let oracle = EuclideanOracle::default();
/// let d = oracle
///     .fetch_distance(Coordinate::new(0.0, 0.0), Coordinate::new(3.0, 4.0))
///     .unwrap();
/// assert!((d - 5.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EuclideanOracle {
    scale: f64,
}

impl EuclideanOracle {
    /// Creates an oracle returning `scale * euclidean_distance`.
    pub fn with_scale(scale: f64) -> Self {
        Self { scale }
    }
}

impl Default for EuclideanOracle {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl DistanceOracle for EuclideanOracle {
    fn fetch_distance(&self, from: Coordinate, to: Coordinate) -> Result<f64, OracleError> {
        let dx = from.x - to.x;
        let dy = from.y - to.y;
        Ok(self.scale * (dx * dx + dy * dy).sqrt())
    }
}

/// Great-circle ("as the crow flies") distance in whole meters.
///
/// Reads `x` as latitude and `y` as longitude, in degrees.
///
/// # Examples
///
/// ```
/// use u_cvrp::distance::{DistanceOracle, HaversineOracle};
/// use u_cvrp::models::Coordinate;
///
/// // One degree of latitude is roughly 111.2 km.
/// let d = HaversineOracle
///     .fetch_distance(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0))
///     .unwrap();
/// assert_eq!(d, 111_195.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HaversineOracle;

impl DistanceOracle for HaversineOracle {
    fn fetch_distance(&self, from: Coordinate, to: Coordinate) -> Result<f64, OracleError> {
        let lat1 = from.x.to_radians();
        let lat2 = to.x.to_radians();
        let dlat = lat2 - lat1;
        let dlng = (to.y - from.y).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        Ok((EARTH_RADIUS_M * c).round())
    }
}
