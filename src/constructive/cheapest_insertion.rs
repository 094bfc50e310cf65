//! Cheapest feasible insertion construction.
//!
//! Starts from one empty route per vehicle and repeatedly inserts the
//! unassigned location whose best feasible insertion adds the least
//! distance. Every route is anchored at the depot on both ends, so inserting
//! `l` between `prev` and `next` costs:
//!
//! ```text
//! delta = d(prev, l) + d(l, next) - d(prev, next)
//! ```
//!
//! Ties are broken by lowest location index, then lowest vehicle index, then
//! lowest position, which makes the result reproducible.
//!
//! # Complexity
//!
//! O(n² × (m + n)) distance lookups where n = locations, m = vehicles.

use tracing::{debug, instrument, trace};

use crate::distance::DistanceMatrix;
use crate::error::{InfeasibleError, RoutingError};
use crate::evaluation::CapacityTracker;
use crate::local_search::{insertion_cost, EPS};
use crate::models::{ProblemInstance, Solution};

/// A candidate placement of a location into a route.
#[derive(Debug, Clone, Copy)]
struct Insertion {
    location: usize,
    vehicle: usize,
    position: usize,
    delta: f64,
}

/// Builds an initial solution covering every non-depot location.
///
/// # Arguments
///
/// * `instance` — Validated problem instance
/// * `distances` — Distance matrix, filled lazily as insertions are priced
///
/// # Errors
///
/// * [`RoutingError::Infeasible`] if a demand exceeds the largest vehicle,
///   total demand exceeds fleet capacity (both checked before any distance
///   lookup), or some location fits no vehicle's residual capacity during
///   construction.
/// * [`RoutingError::OracleUnavailable`] if a required distance cannot be
///   fetched.
///
/// # Examples
///
/// ```
/// use u_cvrp::models::{Coordinate, ProblemInstance};
/// use u_cvrp::distance::{DistanceMatrix, EuclideanOracle};
/// use u_cvrp::constructive::cheapest_insertion;
///
/// let instance = ProblemInstance::uniform(
///     vec![
///         Coordinate::new(0.0, 0.0),
///         Coordinate::new(1.0, 0.0),
///         Coordinate::new(2.0, 0.0),
///         Coordinate::new(3.0, 0.0),
///     ],
///     vec![0, 10, 10, 10],
///     1,
///     30,
/// ).unwrap();
/// let oracle = EuclideanOracle::default();
/// let dm = DistanceMatrix::new(&instance, &oracle);
///
/// let solution = cheapest_insertion(&instance, &dm).unwrap();
/// assert_eq!(solution.num_served(), 3);
/// assert_eq!(solution.routes()[0].len(), 3);
/// ```
#[instrument(skip_all, level = "debug")]
pub fn cheapest_insertion(
    instance: &ProblemInstance,
    distances: &DistanceMatrix<'_>,
) -> Result<Solution, RoutingError> {
    check_fleet_capacity(instance)?;

    let mut solution = Solution::with_vehicles(instance.num_vehicles());
    let mut tracker = CapacityTracker::new(instance);
    let mut unassigned: Vec<usize> = instance.stops().collect();

    debug!(
        locations = unassigned.len(),
        vehicles = instance.num_vehicles(),
        "start cheapest insertion"
    );

    while let Some(best) = best_insertion(instance, distances, &solution, &tracker, &unassigned)? {
        trace!(
            location = best.location,
            vehicle = best.vehicle,
            position = best.position,
            delta = best.delta,
            "insert"
        );
        solution.routes_mut()[best.vehicle].insert(best.position, best.location);
        tracker.assign(best.vehicle, best.location);
        unassigned.retain(|&l| l != best.location);
    }

    debug!(
        used_routes = solution.num_used_routes(),
        oracle_calls = distances.oracle_calls(),
        "cheapest insertion finished"
    );
    Ok(solution)
}

/// Rejects instances no assignment can serve, before any distance lookup.
fn check_fleet_capacity(instance: &ProblemInstance) -> Result<(), InfeasibleError> {
    let max_capacity = instance.max_capacity();
    if let Some(location) = instance
        .stops()
        .find(|&l| instance.demand(l) > max_capacity)
    {
        return Err(InfeasibleError::DemandExceedsCapacity {
            location,
            demand: instance.demand(location),
            max_capacity,
        });
    }

    let total_demand = instance.total_demand();
    let fleet_capacity = instance.fleet_capacity();
    if total_demand > fleet_capacity {
        return Err(InfeasibleError::TotalDemandExceedsFleet {
            total_demand,
            fleet_capacity,
        });
    }
    Ok(())
}

/// Scans every (location, vehicle, position) triple in lexicographic order,
/// keeping the first strictly cheaper feasible insertion.
///
/// Returns `None` only once `unassigned` is empty: a location that fits no
/// vehicle's residual capacity is reported before any distance lookup.
fn best_insertion(
    instance: &ProblemInstance,
    distances: &DistanceMatrix<'_>,
    solution: &Solution,
    tracker: &CapacityTracker<'_>,
    unassigned: &[usize],
) -> Result<Option<Insertion>, RoutingError> {
    let max_residual = tracker.max_residual();
    if let Some(&location) = unassigned
        .iter()
        .find(|&&l| instance.demand(l) > max_residual)
    {
        return Err(InfeasibleError::NoFeasibleInsertion {
            location,
            demand: instance.demand(location),
        }
        .into());
    }

    let depot = instance.depot();
    let mut best: Option<Insertion> = None;

    for &location in unassigned {
        for (vehicle, route) in solution.routes().iter().enumerate() {
            if !tracker.can_append(vehicle, location) {
                continue;
            }
            for position in 0..=route.len() {
                let delta = insertion_cost(route.stops(), position, location, depot, distances)?;
                if best.is_none_or(|b| delta < b.delta - EPS) {
                    best = Some(Insertion {
                        location,
                        vehicle,
                        position,
                        delta,
                    });
                }
            }
        }
    }

    Ok(best)
}
