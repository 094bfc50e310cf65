//! Inter-route stop relocation operator.
//!
//! # Algorithm
//!
//! Tries moving each stop from its current route to every position of every
//! other route, empty routes included. The best move that reduces total
//! distance and fits the receiving vehicle's capacity is applied.
//!
//! Candidates are priced in parallel per source route; the winner is picked
//! sequentially so the result does not depend on thread scheduling.
//!
//! # Complexity
//!
//! O(n² × R) per pass where n = stops, R = number of routes.
//!
//! # Reference
//!
//! Or, I. (1976). "Traveling Salesman-Type Combinatorial Problems and Their
//! Relation to the Logistics of Blood Banking". PhD thesis.

use rayon::prelude::*;

use crate::distance::DistanceMatrix;
use crate::error::RoutingError;
use crate::evaluation::CapacityTracker;
use crate::models::{ProblemInstance, Solution};

use super::EPS;

/// A relocate move: move a stop from one route to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RelocateMove {
    pub from_route: usize,
    pub from_pos: usize,
    pub to_route: usize,
    pub to_pos: usize,
    pub delta: f64,
}

/// Applies inter-route relocate improvement to a solution.
///
/// Repeatedly applies the best improving relocation until none is left.
/// Every receiving route stays within its vehicle's capacity.
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
/// use u_cvrp::local_search::relocate_improve;
///
/// let instance = ProblemInstance::uniform(
///     vec![
///         Coordinate::new(0.0, 0.0),
///         Coordinate::new(10.0, 0.0),
///         Coordinate::new(11.0, 0.0),
///         Coordinate::new(0.0, 10.0),
///     ],
///     vec![0, 5, 5, 5],
///     2,
///     10,
/// ).unwrap();
/// let oracle = EuclideanOracle::default();
/// let dm = DistanceMatrix::new(&instance, &oracle);
///
/// // Stop 2 sits next to stop 1 but rides with stop 3.
/// let initial = Solution::from_stops(vec![vec![1], vec![3, 2]]);
/// let improved = relocate_improve(&initial, &instance, &dm).unwrap();
///
/// let eval = RouteEvaluator::new(&instance, &dm);
/// assert!(eval.total_distance(&improved).unwrap() < eval.total_distance(&initial).unwrap());
/// assert!(eval.check_solution(&improved).is_empty());
/// ```
pub fn relocate_improve(
    solution: &Solution,
    instance: &ProblemInstance,
    distances: &DistanceMatrix<'_>,
) -> Result<Solution, RoutingError> {
    let mut current = solution.clone();
    let mut tracker = CapacityTracker::from_solution(instance, &current);

    while let Some(mv) = find_best_relocate(instance, distances, &current, &tracker)? {
        apply_relocate(&mut current, &mut tracker, &mv);
    }

    Ok(current)
}

/// Finds the best improving relocate move across all route pairs.
pub(crate) fn find_best_relocate(
    instance: &ProblemInstance,
    distances: &DistanceMatrix<'_>,
    solution: &Solution,
    tracker: &CapacityTracker<'_>,
) -> Result<Option<RelocateMove>, RoutingError> {
    let candidates = (0..solution.num_routes())
        .into_par_iter()
        .map(|from_route| best_relocate_from(instance, distances, solution, tracker, from_route))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(pick_best(candidates.into_iter().flatten()))
}

/// Applies a relocate move and updates the route loads.
pub(crate) fn apply_relocate(
    solution: &mut Solution,
    tracker: &mut CapacityTracker<'_>,
    mv: &RelocateMove,
) {
    let routes = solution.routes_mut();
    let location = routes[mv.from_route].remove(mv.from_pos);
    routes[mv.to_route].insert(mv.to_pos, location);
    tracker.release(mv.from_route, location);
    tracker.assign(mv.to_route, location);
}

/// Best improving move taking a stop out of `from_route`.
fn best_relocate_from(
    instance: &ProblemInstance,
    distances: &DistanceMatrix<'_>,
    solution: &Solution,
    tracker: &CapacityTracker<'_>,
    from_route: usize,
) -> Result<Option<RelocateMove>, RoutingError> {
    let depot = instance.depot();
    let routes = solution.routes();
    let source = routes[from_route].stops();
    let mut best: Option<RelocateMove> = None;

    for (from_pos, &location) in source.iter().enumerate() {
        let removal_delta = removal_cost(source, from_pos, depot, distances)?;

        for (to_route, target) in routes.iter().enumerate() {
            if to_route == from_route || !tracker.can_append(to_route, location) {
                continue;
            }

            for to_pos in 0..=target.len() {
                let insertion_delta =
                    insertion_cost(target.stops(), to_pos, location, depot, distances)?;
                let delta = removal_delta + insertion_delta;

                if delta < -EPS && best.is_none_or(|b| delta < b.delta - EPS) {
                    best = Some(RelocateMove {
                        from_route,
                        from_pos,
                        to_route,
                        to_pos,
                        delta,
                    });
                }
            }
        }
    }

    Ok(best)
}

/// Lowest delta wins; near-ties keep the earliest candidate.
fn pick_best(candidates: impl Iterator<Item = RelocateMove>) -> Option<RelocateMove> {
    candidates.fold(None, |best: Option<RelocateMove>, mv| {
        if best.is_none_or(|b| mv.delta < b.delta - EPS) {
            Some(mv)
        } else {
            best
        }
    })
}

/// Cost change of removing the stop at `pos` from `route`.
pub(crate) fn removal_cost(
    route: &[usize],
    pos: usize,
    depot: usize,
    distances: &DistanceMatrix<'_>,
) -> Result<f64, RoutingError> {
    let prev = if pos == 0 { depot } else { route[pos - 1] };
    let next = if pos == route.len() - 1 {
        depot
    } else {
        route[pos + 1]
    };
    let location = route[pos];

    // Old: prev → location → next
    // New: prev → next
    Ok(distances.cost(prev, next)?
        - distances.cost(prev, location)?
        - distances.cost(location, next)?)
}

/// Cost change of inserting `location` at `pos` in `route`.
pub fn insertion_cost(
    route: &[usize],
    pos: usize,
    location: usize,
    depot: usize,
    distances: &DistanceMatrix<'_>,
) -> Result<f64, RoutingError> {
    let prev = if pos == 0 { depot } else { route[pos - 1] };
    let next = if pos == route.len() { depot } else { route[pos] };

    // Old: prev → next
    // New: prev → location → next
    Ok(distances.cost(prev, location)? + distances.cost(location, next)?
        - distances.cost(prev, next)?)
}
