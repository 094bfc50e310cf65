//! Solution and violation types.

use super::Route;

/// A type of constraint violation in a solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationType {
    /// Vehicle capacity exceeded.
    CapacityExceeded {
        /// Vehicle (route) index in the solution.
        vehicle: usize,
        /// Load that exceeded capacity.
        load: u64,
        /// Vehicle capacity.
        capacity: u64,
    },
    /// A non-depot location is not visited by any route.
    Unvisited {
        /// The missing location.
        location: usize,
    },
    /// A location is visited more than once across all routes.
    VisitedTwice {
        /// The repeated location.
        location: usize,
    },
    /// A route lists the depot (or an unknown index) as a stop.
    InvalidStop {
        /// Vehicle (route) index in the solution.
        vehicle: usize,
        /// The offending index.
        location: usize,
    },
    /// The solution does not hold exactly one route per vehicle.
    RouteCountMismatch {
        /// Routes in the solution.
        routes: usize,
        /// Vehicles in the fleet.
        vehicles: usize,
    },
}

/// A constraint violation in a solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The type of violation.
    pub kind: ViolationType,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationType) -> Self {
        Self { kind }
    }
}

/// A complete assignment of stops to vehicles.
///
/// Holds exactly one route per vehicle, indexed by vehicle ID. Routes of
/// unused vehicles are empty.
///
/// # Examples
///
/// ```
/// use u_cvrp::models::Solution;
///
/// let sol = Solution::with_vehicles(2);
/// assert_eq!(sol.num_routes(), 2);
/// assert_eq!(sol.num_served(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    routes: Vec<Route>,
}

impl Solution {
    /// Creates a solution with one empty route per vehicle.
    pub fn with_vehicles(num_vehicles: usize) -> Self {
        Self {
            routes: (0..num_vehicles).map(Route::new).collect(),
        }
    }

    /// Creates a solution from per-vehicle stop sequences.
    ///
    /// The i-th sequence is assigned to vehicle i.
    pub fn from_stops(stops: Vec<Vec<usize>>) -> Self {
        Self {
            routes: stops
                .into_iter()
                .enumerate()
                .map(|(vehicle, stops)| Route::with_stops(vehicle, stops))
                .collect(),
        }
    }

    /// Returns the routes, indexed by vehicle.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Returns a mutable reference to the routes.
    pub fn routes_mut(&mut self) -> &mut [Route] {
        &mut self.routes
    }

    /// Returns the route of `vehicle`, if it exists.
    pub fn route(&self, vehicle: usize) -> Option<&Route> {
        self.routes.get(vehicle)
    }

    /// Number of routes (equals the fleet size).
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Number of routes with at least one stop.
    pub fn num_used_routes(&self) -> usize {
        self.routes.iter().filter(|r| !r.is_empty()).count()
    }

    /// Total number of stops served across all routes.
    pub fn num_served(&self) -> usize {
        self.routes.iter().map(|r| r.len()).sum()
    }

    /// Clones the stop sequences out of the routes.
    pub fn to_stops(&self) -> Vec<Vec<usize>> {
        self.routes.iter().map(|r| r.stops().to_vec()).collect()
    }
}
