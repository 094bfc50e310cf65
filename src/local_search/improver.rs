//! Budgeted local search driver.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use crate::distance::DistanceMatrix;
use crate::error::RoutingError;
use crate::evaluation::CapacityTracker;
use crate::models::{ProblemInstance, Solution};

use super::exchange::{apply_exchange, find_best_exchange};
use super::or_opt::or_opt_improve;
use super::relocate::{apply_relocate, find_best_relocate};
use super::two_opt::two_opt_improve;
use super::EPS;

/// Limits on how long [`LocalSearch`] may run.
///
/// A `None` field imposes no limit. One iteration is one full pass over
/// every route followed by at most one inter-route move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchBudget {
    /// Maximum number of passes.
    pub max_iterations: Option<usize>,
    /// Wall-clock limit, checked between passes.
    pub time_limit: Option<Duration>,
}

impl SearchBudget {
    /// A budget without any limit.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Caps the number of passes.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Caps the wall-clock time.
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    fn exhausted(&self, iterations: usize, started: Instant) -> bool {
        self.max_iterations.is_some_and(|max| iterations >= max)
            || self.time_limit.is_some_and(|limit| started.elapsed() >= limit)
    }
}

/// Improves a feasible solution with 2-opt, or-opt, relocate and exchange.
///
/// Each pass runs 2-opt then or-opt on every route, then applies the best
/// improving relocation, or failing that the best improving exchange.
/// The search stops when a pass changes nothing or the budget runs out.
/// Every applied move strictly reduces total distance and keeps all routes
/// within capacity, so the result is never worse than the input.
///
/// # Examples
///
/// ```
/// use u_cvrp::models::{Coordinate, ProblemInstance, Solution};
/// use u_cvrp::distance::{DistanceMatrix, EuclideanOracle};
/// use u_cvrp::evaluation::RouteEvaluator;
/// use u_cvrp::local_search::{LocalSearch, SearchBudget};
///
/// let instance = ProblemInstance::uniform(
///     vec![
///         Coordinate::new(0.0, 0.0),
///         Coordinate::new(1.0, 0.0),
///         Coordinate::new(2.0, 0.0),
///         Coordinate::new(0.0, 1.0),
///         Coordinate::new(0.0, 2.0),
///     ],
///     vec![0, 3, 3, 3, 3],
///     2,
///     6,
/// ).unwrap();
/// let oracle = EuclideanOracle::default();
/// let dm = DistanceMatrix::new(&instance, &oracle);
///
/// let initial = Solution::from_stops(vec![vec![3, 1], vec![4, 2]]);
/// let improved = LocalSearch::new(SearchBudget::unlimited())
///     .improve(&instance, &dm, initial)
///     .unwrap();
///
/// let eval = RouteEvaluator::new(&instance, &dm);
/// assert!((eval.total_distance(&improved).unwrap() - 8.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSearch {
    budget: SearchBudget,
}

impl LocalSearch {
    /// Creates a local search bounded by `budget`.
    pub fn new(budget: SearchBudget) -> Self {
        Self { budget }
    }

    /// Returns the search budget.
    pub fn budget(&self) -> SearchBudget {
        self.budget
    }

    /// Runs the search from `solution`.
    ///
    /// # Errors
    ///
    /// Propagates [`RoutingError::OracleUnavailable`]. No partial result is
    /// returned in that case.
    #[instrument(skip_all, level = "debug")]
    pub fn improve(
        &self,
        instance: &ProblemInstance,
        distances: &DistanceMatrix<'_>,
        solution: Solution,
    ) -> Result<Solution, RoutingError> {
        let started = Instant::now();
        let depot = instance.depot();
        let mut current = solution;
        let mut tracker = CapacityTracker::from_solution(instance, &current);
        let mut iterations = 0;

        debug!(
            max_iterations = ?self.budget.max_iterations,
            time_limit = ?self.budget.time_limit,
            "start local search"
        );

        loop {
            if self.budget.exhausted(iterations, started) {
                warn!(
                    iterations,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "local search budget exhausted"
                );
                break;
            }
            iterations += 1;

            let mut improved = false;
            for route in current.routes_mut() {
                if route.len() < 2 {
                    continue;
                }
                let before = distances.route_distance(route.stops(), depot)?;
                let (stops, _) = two_opt_improve(route.stops(), depot, distances)?;
                let (stops, after) = or_opt_improve(&stops, depot, distances)?;
                if after < before - EPS {
                    trace!(vehicle = route.vehicle_id(), before, after, "intra-route move");
                    route.set_stops(stops);
                    improved = true;
                }
            }

            if let Some(mv) = find_best_relocate(instance, distances, &current, &tracker)? {
                trace!(
                    from_route = mv.from_route,
                    to_route = mv.to_route,
                    delta = mv.delta,
                    "relocate"
                );
                apply_relocate(&mut current, &mut tracker, &mv);
                improved = true;
            } else if let Some(mv) = find_best_exchange(instance, distances, &current, &tracker)? {
                trace!(
                    route_a = mv.route_a,
                    route_b = mv.route_b,
                    delta = mv.delta,
                    "exchange"
                );
                apply_exchange(&mut current, &mut tracker, &mv);
                improved = true;
            }

            if !improved {
                break;
            }
        }

        debug!(iterations, "local search finished");
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::EuclideanOracle;
    use crate::evaluation::RouteEvaluator;
    use crate::models::Coordinate;

    fn corner_instance() -> ProblemInstance {
        ProblemInstance::uniform(
            vec![
                Coordinate::new(0.0, 0.0),
                Coordinate::new(1.0, 0.0),
                Coordinate::new(2.0, 0.0),
                Coordinate::new(0.0, 1.0),
                Coordinate::new(0.0, 2.0),
            ],
            vec![0, 3, 3, 3, 3],
            2,
            6,
        )
        .expect("valid")
    }

    #[test]
    fn test_budget_exhausted() {
        let start = Instant::now();
        assert!(!SearchBudget::unlimited().exhausted(1_000_000, start));
        assert!(SearchBudget::unlimited().with_max_iterations(3).exhausted(3, start));
        assert!(!SearchBudget::unlimited().with_max_iterations(3).exhausted(2, start));
        assert!(SearchBudget::unlimited()
            .with_time_limit(Duration::ZERO)
            .exhausted(0, start));
    }

    #[test]
    fn test_improve_reaches_axis_split() {
        let inst = corner_instance();
        let oracle = EuclideanOracle::default();
        let dm = DistanceMatrix::new(&inst, &oracle);
        let initial = Solution::from_stops(vec![vec![3, 1], vec![4, 2]]);
        let improved = LocalSearch::default()
            .improve(&inst, &dm, initial)
            .expect("ok");

        let eval = RouteEvaluator::new(&inst, &dm);
        assert!(eval.check_solution(&improved).is_empty());
        assert!((eval.total_distance(&improved).expect("ok") - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_iterations_returns_input() {
        let inst = corner_instance();
        let oracle = EuclideanOracle::default();
        let dm = DistanceMatrix::new(&inst, &oracle);
        let initial = Solution::from_stops(vec![vec![3, 1], vec![4, 2]]);
        let search = LocalSearch::new(SearchBudget::unlimited().with_max_iterations(0));
        let result = search.improve(&inst, &dm, initial.clone()).expect("ok");
        assert_eq!(result, initial);
        assert_eq!(dm.oracle_calls(), 0);
    }

    #[test]
    fn test_improve_fixes_intra_route_order() {
        let inst = ProblemInstance::uniform(
            (0..5).map(|i| Coordinate::new(i as f64, 0.0)).collect(),
            vec![0, 1, 1, 1, 1],
            1,
            10,
        )
        .expect("valid");
        let oracle = EuclideanOracle::default();
        let dm = DistanceMatrix::new(&inst, &oracle);
        let initial = Solution::from_stops(vec![vec![3, 1, 4, 2]]);
        let improved = LocalSearch::default()
            .improve(&inst, &dm, initial)
            .expect("ok");
        let eval = RouteEvaluator::new(&inst, &dm);
        assert!((eval.total_distance(&improved).expect("ok") - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_improve_already_optimal_is_stable() {
        let inst = corner_instance();
        let oracle = EuclideanOracle::default();
        let dm = DistanceMatrix::new(&inst, &oracle);
        let optimal = Solution::from_stops(vec![vec![1, 2], vec![3, 4]]);
        let result = LocalSearch::default()
            .improve(&inst, &dm, optimal.clone())
            .expect("ok");
        assert_eq!(result, optimal);
    }
}
