//! Solution extraction into an externally consumed report.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::distance::DistanceMatrix;
use crate::error::RoutingError;
use crate::evaluation::RouteEvaluator;
use crate::models::{ProblemInstance, Solution};

/// Per-vehicle part of a [`SolutionReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteReport {
    /// Vehicle index.
    pub vehicle: usize,
    /// Visited locations in order, depot excluded.
    pub stops: Vec<usize>,
    /// Cumulative load after each stop.
    pub loads: Vec<u64>,
    /// Total load carried on the route.
    pub load: u64,
    /// Route distance, depot legs included.
    pub distance: f64,
}

/// Read-only report of a solved instance.
///
/// # Examples
///
/// ```
/// use u_cvrp::models::{Coordinate, ProblemInstance, Solution};
/// use u_cvrp::distance::{DistanceMatrix, EuclideanOracle};
/// use u_cvrp::report::extract;
///
/// let instance = ProblemInstance::uniform(
///     vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 2.0)],
///     vec![0, 4],
///     2,
///     5,
/// ).unwrap();
/// let oracle = EuclideanOracle::default();
/// let dm = DistanceMatrix::new(&instance, &oracle);
///
/// let solution = Solution::from_stops(vec![vec![1], vec![]]);
/// let report = extract(&instance, &dm, &solution).unwrap();
/// assert_eq!(report.routes[0].loads, vec![4]);
/// assert!((report.total_distance - 4.0).abs() < 1e-10);
/// assert!(report.routes[1].stops.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionReport {
    /// One entry per vehicle, in vehicle order.
    pub routes: Vec<RouteReport>,
    /// Sum of all route distances.
    pub total_distance: f64,
}

impl SolutionReport {
    /// Report of `vehicle`, if it exists.
    pub fn route(&self, vehicle: usize) -> Option<&RouteReport> {
        self.routes.get(vehicle)
    }

    /// Serializes the report as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Walks every route of `solution` and recomputes its report.
///
/// Performs no optimization: the report reflects the solution exactly.
/// Calling it twice on the same solution yields identical reports.
///
/// # Errors
///
/// Propagates [`RoutingError::OracleUnavailable`].
pub fn extract(
    instance: &ProblemInstance,
    distances: &DistanceMatrix<'_>,
    solution: &Solution,
) -> Result<SolutionReport, RoutingError> {
    let evaluator = RouteEvaluator::new(instance, distances);
    let routes = solution
        .routes()
        .iter()
        .map(|r| evaluator.evaluate_route(r))
        .collect::<Result<Vec<_>, _>>()?;
    let total_distance = routes.iter().map(|r| r.distance).sum();

    debug!(routes = routes.len(), total_distance, "extracted solution report");
    Ok(SolutionReport {
        routes,
        total_distance,
    })
}
