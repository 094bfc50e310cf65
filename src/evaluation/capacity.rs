//! Per-route load bookkeeping against vehicle capacities.

use crate::models::{ProblemInstance, Solution};

/// Tracks the running load of every vehicle's route.
///
/// [`can_append`](Self::can_append) answers from the running counter, so
/// construction never re-sums a partial route. [`is_feasible`](Self::is_feasible)
/// re-sums an arbitrary candidate route from scratch.
///
/// # Examples
///
/// ```
/// use u_cvrp::models::{Coordinate, ProblemInstance};
/// use u_cvrp::evaluation::CapacityTracker;
///
/// let instance = ProblemInstance::uniform(
///     vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0), Coordinate::new(2.0, 0.0)],
///     vec![0, 4, 3],
///     1,
///     6,
/// ).unwrap();
///
/// let mut tracker = CapacityTracker::new(&instance);
/// assert!(tracker.can_append(0, 1));
/// tracker.assign(0, 1);
/// assert_eq!(tracker.residual(0), 2);
/// assert!(!tracker.can_append(0, 2));
/// assert!(!tracker.is_feasible(&[1, 2], 0));
/// ```
#[derive(Debug, Clone)]
pub struct CapacityTracker<'a> {
    instance: &'a ProblemInstance,
    loads: Vec<u64>,
}

impl<'a> CapacityTracker<'a> {
    /// Creates a tracker with every route empty.
    pub fn new(instance: &'a ProblemInstance) -> Self {
        Self {
            instance,
            loads: vec![0; instance.num_vehicles()],
        }
    }

    /// Creates a tracker holding the loads of an existing solution.
    ///
    /// # Panics
    ///
    /// Panics if the solution refers to an unknown vehicle or location.
    pub fn from_solution(instance: &'a ProblemInstance, solution: &Solution) -> Self {
        let mut tracker = Self::new(instance);
        for route in solution.routes() {
            tracker.loads[route.vehicle_id()] = tracker.route_load(route.stops());
        }
        tracker
    }

    /// Returns `true` if the total demand of `route` fits `vehicle`.
    pub fn is_feasible(&self, route: &[usize], vehicle: usize) -> bool {
        self.route_load(route) <= self.instance.capacity(vehicle)
    }

    /// Returns `true` if adding `location` keeps `vehicle`'s route feasible.
    pub fn can_append(&self, vehicle: usize, location: usize) -> bool {
        self.loads[vehicle].saturating_add(self.instance.demand(location))
            <= self.instance.capacity(vehicle)
    }

    /// Returns `true` if replacing `removed` by `added` keeps `vehicle`'s
    /// route feasible.
    pub fn can_exchange(&self, vehicle: usize, removed: usize, added: usize) -> bool {
        self.loads[vehicle]
            .saturating_sub(self.instance.demand(removed))
            .saturating_add(self.instance.demand(added))
            <= self.instance.capacity(vehicle)
    }

    /// Adds the demand of `location` to `vehicle`'s running load.
    pub fn assign(&mut self, vehicle: usize, location: usize) {
        self.loads[vehicle] += self.instance.demand(location);
    }

    /// Removes the demand of `location` from `vehicle`'s running load.
    pub fn release(&mut self, vehicle: usize, location: usize) {
        self.loads[vehicle] -= self.instance.demand(location);
    }

    /// Current load of `vehicle`'s route.
    pub fn load(&self, vehicle: usize) -> u64 {
        self.loads[vehicle]
    }

    /// Capacity left on `vehicle`.
    pub fn residual(&self, vehicle: usize) -> u64 {
        self.instance.capacity(vehicle).saturating_sub(self.loads[vehicle])
    }

    /// Largest residual capacity across the fleet.
    pub fn max_residual(&self) -> u64 {
        (0..self.loads.len())
            .map(|v| self.residual(v))
            .max()
            .unwrap_or(0)
    }

    fn route_load(&self, route: &[usize]) -> u64 {
        route
            .iter()
            .fold(0, |load: u64, &l| load.saturating_add(self.instance.demand(l)))
    }
}
