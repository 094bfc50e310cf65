//! Vehicle type with a load capacity.

/// A vehicle of the fleet. Every vehicle starts and ends at the depot.
///
/// # Examples
///
/// ```
/// use u_cvrp::models::Vehicle;
///
/// let v = Vehicle::new(0, 15);
/// assert_eq!(v.id(), 0);
/// assert_eq!(v.capacity(), 15);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    id: usize,
    capacity: u64,
}

impl Vehicle {
    /// Creates a vehicle with the given ID and capacity.
    pub fn new(id: usize, capacity: u64) -> Self {
        Self { id, capacity }
    }

    /// Vehicle ID (its position in the fleet).
    pub fn id(&self) -> usize {
        self.id
    }

    /// Maximum load capacity.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Returns `true` if `load` fits within this vehicle's capacity.
    pub fn fits(&self, load: u64) -> bool {
        load <= self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_new() {
        let v = Vehicle::new(2, 200);
        assert_eq!(v.id(), 2);
        assert_eq!(v.capacity(), 200);
    }

    #[test]
    fn test_vehicle_fits() {
        let v = Vehicle::new(0, 6);
        assert!(v.fits(0));
        assert!(v.fits(6));
        assert!(!v.fits(7));
    }
}
