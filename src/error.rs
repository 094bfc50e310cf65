//! Error types for instance validation, distance lookup, and solving.

use thiserror::Error;

/// A malformed problem description, rejected before any solving starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstanceError {
    /// No locations were supplied (the depot itself is missing).
    #[error("at least one location (the depot) is required")]
    NoLocations,

    /// The depot index does not refer to a supplied location.
    #[error("depot index {depot} is out of range for {locations} locations")]
    DepotOutOfRange { depot: usize, locations: usize },

    /// The demand list and the location list differ in length.
    #[error("{demands} demands supplied for {locations} locations")]
    DemandLengthMismatch { demands: usize, locations: usize },

    /// The depot carries a demand.
    #[error("depot demand must be 0, got {demand}")]
    DepotDemandNonZero { demand: i64 },

    /// A location carries a negative demand.
    #[error("location {location} has negative demand {demand}")]
    NegativeDemand { location: usize, demand: i64 },

    /// The fleet is empty.
    #[error("at least one vehicle is required")]
    NoVehicles,

    /// A vehicle has a negative capacity.
    #[error("vehicle {vehicle} has negative capacity {capacity}")]
    NegativeCapacity { vehicle: usize, capacity: i64 },

    /// Per-vehicle capacities were supplied for a different fleet size.
    #[error("{capacities} capacities supplied for {vehicles} vehicles")]
    CapacityLengthMismatch { capacities: usize, vehicles: usize },

    /// A coordinate component is NaN or infinite.
    #[error("location {location} has a non-finite coordinate")]
    NonFiniteCoordinate { location: usize },
}

/// The fleet cannot serve every location under its capacity limits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InfeasibleError {
    /// A single location needs more than the largest vehicle can carry.
    #[error("location {location} demands {demand} but the largest vehicle carries {max_capacity}")]
    DemandExceedsCapacity {
        location: usize,
        demand: u64,
        max_capacity: u64,
    },

    /// Total demand is larger than the combined fleet capacity.
    #[error("total demand {total_demand} exceeds fleet capacity {fleet_capacity}")]
    TotalDemandExceedsFleet {
        total_demand: u128,
        fleet_capacity: u128,
    },

    /// Construction left a location that fits no vehicle's residual capacity.
    #[error("no vehicle has residual capacity for location {location} (demand {demand})")]
    NoFeasibleInsertion { location: usize, demand: u64 },
}

/// Failure reported by a [`DistanceOracle`](crate::distance::DistanceOracle).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OracleError {
    /// The cost source could not be reached.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The cost source answered with a non-success status.
    #[error("distance service returned status {0}")]
    Status(String),

    /// The response could not be interpreted.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The returned cost is negative or not finite.
    #[error("invalid travel cost {0}")]
    InvalidCost(f64),
}

/// Terminal outcome of a failed solve.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// A required travel cost could not be obtained.
    #[error("distance oracle unavailable for {from} -> {to}: {source}")]
    OracleUnavailable {
        from: usize,
        to: usize,
        #[source]
        source: OracleError,
    },

    /// The fleet is too small for the demand.
    #[error("infeasible instance: {0}")]
    Infeasible(#[from] InfeasibleError),

    /// The problem description is malformed.
    #[error("invalid instance: {0}")]
    InvalidInstance(#[from] InstanceError),
}

impl RoutingError {
    /// Returns `true` for [`RoutingError::OracleUnavailable`].
    pub fn is_oracle_unavailable(&self) -> bool {
        matches!(self, RoutingError::OracleUnavailable { .. })
    }

    /// Returns `true` for [`RoutingError::Infeasible`].
    pub fn is_infeasible(&self) -> bool {
        matches!(self, RoutingError::Infeasible(_))
    }

    /// Returns `true` for [`RoutingError::InvalidInstance`].
    pub fn is_invalid_instance(&self) -> bool {
        matches!(self, RoutingError::InvalidInstance(_))
    }
}
