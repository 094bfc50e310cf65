//! Route type.

/// An ordered sequence of stops assigned to a single vehicle.
///
/// A route starts and ends at the depot, which is not stored in `stops`.
///
/// # Examples
///
/// ```
/// use u_cvrp::models::Route;
///
/// let mut route = Route::new(0);
/// route.insert(0, 4);
/// route.insert(0, 2);
/// assert_eq!(route.stops(), &[2, 4]);
/// assert_eq!(route.vehicle_id(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    vehicle_id: usize,
    stops: Vec<usize>,
}

impl Route {
    /// Creates an empty route for the given vehicle.
    pub fn new(vehicle_id: usize) -> Self {
        Self {
            vehicle_id,
            stops: Vec::new(),
        }
    }

    /// Creates a route with the given stops.
    pub fn with_stops(vehicle_id: usize, stops: Vec<usize>) -> Self {
        Self { vehicle_id, stops }
    }

    /// Returns the vehicle assigned to this route.
    pub fn vehicle_id(&self) -> usize {
        self.vehicle_id
    }

    /// Returns the stops in visit order (depot excluded).
    pub fn stops(&self) -> &[usize] {
        &self.stops
    }

    /// Replaces the stop sequence.
    pub fn set_stops(&mut self, stops: Vec<usize>) {
        self.stops = stops;
    }

    /// Inserts a stop at `position` (0 = right after leaving the depot).
    ///
    /// # Panics
    ///
    /// Panics if `position > len`.
    pub fn insert(&mut self, position: usize, location: usize) {
        self.stops.insert(position, location);
    }

    /// Removes and returns the stop at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position >= len`.
    pub fn remove(&mut self, position: usize) -> usize {
        self.stops.remove(position)
    }

    /// Replaces the stop at `position`, returning the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `position >= len`.
    pub fn replace(&mut self, position: usize, location: usize) -> usize {
        std::mem::replace(&mut self.stops[position], location)
    }

    /// Number of stops (excluding depot).
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Returns `true` if this route visits no stop.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Location visited before position `position`, or `depot` at the start.
    pub fn predecessor(&self, position: usize, depot: usize) -> usize {
        if position == 0 {
            depot
        } else {
            self.stops[position - 1]
        }
    }

    /// Location visited at position `position`, or `depot` past the end.
    pub fn successor(&self, position: usize, depot: usize) -> usize {
        self.stops.get(position).copied().unwrap_or(depot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_empty() {
        let r = Route::new(0);
        assert!(r.is_empty());
        assert_eq!(r.len(), 0);
        assert_eq!(r.vehicle_id(), 0);
        assert_eq!(r.predecessor(0, 0), 0);
        assert_eq!(r.successor(0, 0), 0);
    }

    #[test]
    fn test_route_neighbours() {
        let r = Route::with_stops(1, vec![5, 3]);
        assert_eq!(r.predecessor(0, 0), 0);
        assert_eq!(r.predecessor(1, 0), 5);
        assert_eq!(r.predecessor(2, 0), 3);
        assert_eq!(r.successor(0, 0), 5);
        assert_eq!(r.successor(2, 0), 0);
    }

    #[test]
    fn test_route_remove_replace() {
        let mut r = Route::with_stops(0, vec![4, 5, 6]);
        assert_eq!(r.remove(1), 5);
        assert_eq!(r.replace(0, 9), 4);
        assert_eq!(r.stops(), &[9, 6]);
    }

    #[test]
    fn test_route_set_stops() {
        let mut r = Route::new(1);
        r.set_stops(vec![7, 8]);
        assert_eq!(r.stops(), &[7, 8]);
        assert_eq!(r.len(), 2);
    }
}
