//! Route evaluator that recomputes distance, load, and feasibility.

use crate::distance::DistanceMatrix;
use crate::error::RoutingError;
use crate::models::{ProblemInstance, Route, Solution, Violation, ViolationType};
use crate::report::RouteReport;

/// Recomputes route metrics from scratch and checks solutions against the
/// coverage and capacity invariants.
///
/// Nothing tracked incrementally during construction or local search is
/// trusted here: loads are re-summed from demands and distances are
/// re-read from the matrix.
///
/// # Examples
///
/// ```
/// use u_cvrp::models::{Coordinate, ProblemInstance, Route};
/// use u_cvrp::distance::{DistanceMatrix, EuclideanOracle};
/// use u_cvrp::evaluation::RouteEvaluator;
///
/// let instance = ProblemInstance::uniform(
///     vec![Coordinate::new(0.0, 0.0), Coordinate::new(3.0, 4.0), Coordinate::new(6.0, 8.0)],
///     vec![0, 10, 20],
///     1,
///     100,
/// ).unwrap();
/// let oracle = EuclideanOracle::default();
/// let dm = DistanceMatrix::new(&instance, &oracle);
///
/// let evaluator = RouteEvaluator::new(&instance, &dm);
/// let report = evaluator.evaluate_route(&Route::with_stops(0, vec![1, 2])).unwrap();
/// assert_eq!(report.loads, vec![10, 30]);
/// assert!((report.distance - 20.0).abs() < 1e-10);
/// ```
pub struct RouteEvaluator<'a> {
    instance: &'a ProblemInstance,
    distances: &'a DistanceMatrix<'a>,
}

impl<'a> RouteEvaluator<'a> {
    /// Creates a new evaluator for the given problem data.
    pub fn new(instance: &'a ProblemInstance, distances: &'a DistanceMatrix<'a>) -> Self {
        Self {
            instance,
            distances,
        }
    }

    /// Walks a route, computing cumulative load after each stop and the
    /// route distance including both depot legs.
    ///
    /// # Errors
    ///
    /// Propagates [`RoutingError::OracleUnavailable`].
    pub fn evaluate_route(&self, route: &Route) -> Result<RouteReport, RoutingError> {
        let depot = self.instance.depot();
        let mut loads = Vec::with_capacity(route.len());
        let mut load: u64 = 0;
        let mut distance = 0.0;
        let mut prev = depot;

        for &stop in route.stops() {
            distance += self.distances.cost(prev, stop)?;
            load = load.saturating_add(self.instance.demand(stop));
            loads.push(load);
            prev = stop;
        }
        if !route.is_empty() {
            distance += self.distances.cost(prev, depot)?;
        }

        Ok(RouteReport {
            vehicle: route.vehicle_id(),
            stops: route.stops().to_vec(),
            loads,
            load,
            distance,
        })
    }

    /// Sum of all route distances.
    ///
    /// # Errors
    ///
    /// Propagates [`RoutingError::OracleUnavailable`].
    pub fn total_distance(&self, solution: &Solution) -> Result<f64, RoutingError> {
        let depot = self.instance.depot();
        solution
            .routes()
            .iter()
            .map(|r| self.distances.route_distance(r.stops(), depot))
            .sum()
    }

    /// Checks coverage and capacity; an empty result means the solution is valid.
    pub fn check_solution(&self, solution: &Solution) -> Vec<Violation> {
        let n = self.instance.num_locations();
        let depot = self.instance.depot();
        let mut violations = Vec::new();
        let mut visits = vec![0usize; n];

        if solution.num_routes() != self.instance.num_vehicles() {
            violations.push(Violation::new(ViolationType::RouteCountMismatch {
                routes: solution.num_routes(),
                vehicles: self.instance.num_vehicles(),
            }));
        }

        for (vehicle, route) in solution.routes().iter().enumerate() {
            let mut load: u64 = 0;
            for &stop in route.stops() {
                if stop == depot || stop >= n {
                    violations.push(Violation::new(ViolationType::InvalidStop {
                        vehicle,
                        location: stop,
                    }));
                    continue;
                }
                visits[stop] += 1;
                load = load.saturating_add(self.instance.demand(stop));
            }

            if let Some(v) = self.instance.vehicles().get(vehicle) {
                if !v.fits(load) {
                    violations.push(Violation::new(ViolationType::CapacityExceeded {
                        vehicle,
                        load,
                        capacity: v.capacity(),
                    }));
                }
            }
        }

        for location in self.instance.stops() {
            match visits[location] {
                0 => violations.push(Violation::new(ViolationType::Unvisited { location })),
                1 => {}
                _ => violations.push(Violation::new(ViolationType::VisitedTwice { location })),
            }
        }

        violations
    }
}
