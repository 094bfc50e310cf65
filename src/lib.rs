//! # u-cvrp
//!
//! Capacitated vehicle routing: a fleet of vehicles leaves one depot, visits
//! every demand location exactly once and returns, without any vehicle
//! carrying more than its capacity. Travel costs come from a pluggable
//! distance oracle and are fetched at most once per ordered pair.
//!
//! ## Modules
//!
//! - [`models`] — Domain model types (Coordinate, Vehicle, Route, Solution, ProblemInstance)
//! - [`distance`] — Distance oracles and the memoizing distance matrix
//! - [`evaluation`] — Capacity bookkeeping and route evaluation
//! - [`constructive`] — Cheapest feasible insertion
//! - [`local_search`] — Local search operators (2-opt, Or-opt, Relocate, Exchange)
//! - [`report`] — Solution extraction
//! - [`solver`] — End-to-end solve with configurable improvement budget
//! - [`error`] — Error types
//!
//! ## Example
//!
//! ```
//! use u_cvrp::distance::EuclideanOracle;
//! use u_cvrp::models::{CapacitySpec, Coordinate, ProblemInput};
//! use u_cvrp::solver::CvrpSolver;
//!
//! let input = ProblemInput {
//!     locations: vec![
//!         Coordinate::new(0.0, 0.0),
//!         Coordinate::new(4.0, 0.0),
//!         Coordinate::new(0.0, 3.0),
//!     ],
//!     depot: 0,
//!     demands: vec![0, 2, 2],
//!     num_vehicles: 1,
//!     capacity: CapacitySpec::Uniform(5),
//! };
//!
//! let report = CvrpSolver::default()
//!     .solve_input(input, &EuclideanOracle::default())
//!     .unwrap();
//! assert_eq!(report.routes[0].load, 4);
//! assert!((report.total_distance - 12.0).abs() < 1e-9);
//! ```

pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod local_search;
pub mod models;
pub mod report;
pub mod solver;

pub use error::RoutingError;
pub use solver::{CvrpSolver, SolverConfig};
