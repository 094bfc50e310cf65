//! Inter-route exchange operator.
//!
//! # Algorithm
//!
//! Swaps one stop of route A with one stop of route B. Each stop takes the
//! other's position, so only the four edges around the two positions change:
//!
//! ```text
//! delta = d(pa, y) + d(y, na) - d(pa, x) - d(x, na)
//!       + d(pb, x) + d(x, nb) - d(pb, y) - d(y, nb)
//! ```
//!
//! The swap is feasible when both routes stay within capacity after trading
//! the two demands. Exchange reaches assignments that relocation cannot when
//! every route is already full.
//!
//! # Complexity
//!
//! O(n²) per pass, where n = stops.
//!
//! # Reference
//!
//! Osman, I.H. (1993). "Metastrategy simulated annealing and tabu search
//! algorithms for the vehicle routing problem", *Annals of Operations
//! Research* 41, 421-451.

use rayon::prelude::*;

use crate::distance::DistanceMatrix;
use crate::error::RoutingError;
use crate::evaluation::CapacityTracker;
use crate::models::{ProblemInstance, Route, Solution};

use super::EPS;

/// A swap of two stops between different routes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ExchangeMove {
    pub route_a: usize,
    pub pos_a: usize,
    pub route_b: usize,
    pub pos_b: usize,
    pub delta: f64,
}

/// Applies inter-route exchange improvement.
///
/// Repeatedly applies the best improving swap until none is left.
///
/// # Errors
///
/// Propagates [`RoutingError::OracleUnavailable`].
///
/// # Examples
///
/// ```
/// use u_cvrp::models::{Coordinate, ProblemInstance, Solution};
/// use u_cvrp::distance::{DistanceMatrix, EuclideanOracle};
/// use u_cvrp::evaluation::RouteEvaluator;
/// use u_cvrp::local_search::exchange_improve;
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
/// // Both routes are full, so only a swap can untangle them.
/// let initial = Solution::from_stops(vec![vec![3, 1], vec![4, 2]]);
/// let improved = exchange_improve(&initial, &instance, &dm).unwrap();
///
/// let eval = RouteEvaluator::new(&instance, &dm);
/// assert!((eval.total_distance(&improved).unwrap() - 8.0).abs() < 1e-9);
/// ```
pub fn exchange_improve(
    solution: &Solution,
    instance: &ProblemInstance,
    distances: &DistanceMatrix<'_>,
) -> Result<Solution, RoutingError> {
    let mut current = solution.clone();
    let mut tracker = CapacityTracker::from_solution(instance, &current);

    while let Some(mv) = find_best_exchange(instance, distances, &current, &tracker)? {
        apply_exchange(&mut current, &mut tracker, &mv);
    }

    Ok(current)
}

/// Finds the best improving swap across all route pairs.
pub(crate) fn find_best_exchange(
    instance: &ProblemInstance,
    distances: &DistanceMatrix<'_>,
    solution: &Solution,
    tracker: &CapacityTracker<'_>,
) -> Result<Option<ExchangeMove>, RoutingError> {
    let candidates = (0..solution.num_routes())
        .into_par_iter()
        .map(|route_a| best_exchange_from(instance, distances, solution, tracker, route_a))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(candidates
        .into_iter()
        .flatten()
        .fold(None, |best: Option<ExchangeMove>, mv| {
            if best.is_none_or(|b| mv.delta < b.delta - EPS) {
                Some(mv)
            } else {
                best
            }
        }))
}

/// Swaps the two stops and updates both route loads.
pub(crate) fn apply_exchange(
    solution: &mut Solution,
    tracker: &mut CapacityTracker<'_>,
    mv: &ExchangeMove,
) {
    let routes = solution.routes_mut();
    let y = routes[mv.route_b].stops()[mv.pos_b];
    let x = routes[mv.route_a].replace(mv.pos_a, y);
    routes[mv.route_b].replace(mv.pos_b, x);

    tracker.release(mv.route_a, x);
    tracker.assign(mv.route_a, y);
    tracker.release(mv.route_b, y);
    tracker.assign(mv.route_b, x);
}

/// Best improving swap between `route_a` and any later route.
fn best_exchange_from(
    instance: &ProblemInstance,
    distances: &DistanceMatrix<'_>,
    solution: &Solution,
    tracker: &CapacityTracker<'_>,
    route_a: usize,
) -> Result<Option<ExchangeMove>, RoutingError> {
    let depot = instance.depot();
    let routes = solution.routes();
    let ra = &routes[route_a];
    let mut best: Option<ExchangeMove> = None;

    for (pos_a, &x) in ra.stops().iter().enumerate() {
        for (route_b, rb) in routes.iter().enumerate().skip(route_a + 1) {
            for (pos_b, &y) in rb.stops().iter().enumerate() {
                if !tracker.can_exchange(route_a, x, y) || !tracker.can_exchange(route_b, y, x) {
                    continue;
                }

                let delta = substitution_cost(ra, pos_a, y, depot, distances)?
                    + substitution_cost(rb, pos_b, x, depot, distances)?;

                if delta < -EPS && best.is_none_or(|b| delta < b.delta - EPS) {
                    best = Some(ExchangeMove {
                        route_a,
                        pos_a,
                        route_b,
                        pos_b,
                        delta,
                    });
                }
            }
        }
    }

    Ok(best)
}

/// Cost change of putting `location` in place of the stop at `pos`.
fn substitution_cost(
    route: &Route,
    pos: usize,
    location: usize,
    depot: usize,
    distances: &DistanceMatrix<'_>,
) -> Result<f64, RoutingError> {
    let prev = route.predecessor(pos, depot);
    let next = route.successor(pos + 1, depot);
    let old = route.stops()[pos];

    Ok(distances.cost(prev, location)? + distances.cost(location, next)?
        - distances.cost(prev, old)?
        - distances.cost(old, next)?)
}
