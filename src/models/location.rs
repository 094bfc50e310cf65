//! Coordinate and location types.

use serde::{Deserialize, Serialize};

/// An opaque coordinate pair handed to the distance oracle.
///
/// The engine never interprets coordinates itself. Geographic oracles read
/// `x` as latitude and `y` as longitude, in degrees.
///
/// # Examples
///
/// ```
/// use u_cvrp::models::Coordinate;
///
/// let c = Coordinate::new(-33.881656, 151.205913);
/// assert!(c.is_finite());
/// assert_eq!(Coordinate::from((1.0, 2.0)), Coordinate::new(1.0, 2.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coordinate {
    /// First component (latitude for geographic oracles).
    pub x: f64,
    /// Second component (longitude for geographic oracles).
    pub y: f64,
}

impl Coordinate {
    /// Creates a coordinate.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns `true` if both components are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(c: Coordinate) -> Self {
        (c.x, c.y)
    }
}

/// A location (depot or demand point) in a routing problem.
///
/// # Examples
///
/// ```
/// use u_cvrp::models::{Coordinate, Location};
///
/// let depot = Location::depot(0, Coordinate::new(0.0, 0.0));
/// assert_eq!(depot.demand(), 0);
///
/// let stop = Location::new(3, Coordinate::new(1.0, 1.0), 8);
/// assert_eq!(stop.index(), 3);
/// assert_eq!(stop.demand(), 8);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    index: usize,
    coordinate: Coordinate,
    demand: u64,
}

impl Location {
    /// Creates a location with the given index, coordinate, and demand.
    pub fn new(index: usize, coordinate: Coordinate, demand: u64) -> Self {
        Self {
            index,
            coordinate,
            demand,
        }
    }

    /// Creates a depot location (demand 0).
    pub fn depot(index: usize, coordinate: Coordinate) -> Self {
        Self::new(index, coordinate, 0)
    }

    /// Location index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Coordinate used to query the distance oracle.
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Quantity to deliver at this location.
    pub fn demand(&self) -> u64 {
        self.demand
    }
}
