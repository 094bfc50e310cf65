//! Domain model types for capacitated vehicle routing.
//!
//! Provides the core abstractions: locations with demands, vehicles with
//! capacities, the raw and validated problem instance, routes as ordered
//! stop sequences, and solutions holding one route per vehicle.

mod location;
mod problem;
mod route;
mod solution;
mod vehicle;

pub use location::{Coordinate, Location};
pub use problem::{sample_locations, CapacitySpec, ProblemInput, ProblemInstance};
pub use route::Route;
pub use solution::{Solution, Violation, ViolationType};
pub use vehicle::Vehicle;
