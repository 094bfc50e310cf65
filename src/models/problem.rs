//! Problem description and validated problem instance.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{Coordinate, Location, Vehicle};
use crate::error::InstanceError;

/// Fleet capacity: one value for every vehicle, or one value per vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapacitySpec {
    /// Every vehicle carries the same capacity.
    Uniform(i64),
    /// Capacity of each vehicle, in fleet order.
    PerVehicle(Vec<i64>),
}

/// Raw problem description as received from a caller.
///
/// Values are kept signed so that malformed input can be reported instead
/// of being rejected by the deserializer. Turn it into a
/// [`ProblemInstance`] with [`ProblemInstance::new`].
///
/// # Examples
///
/// ```
/// use u_cvrp::models::{ProblemInput, ProblemInstance};
///
/// let input: ProblemInput = serde_json::from_str(r#"{
///     "locations": [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
///     "demands": [0, 2, 3],
///     "num_vehicles": 1,
///     "capacity": 5
/// }"#).unwrap();
///
/// let instance = ProblemInstance::new(input).unwrap();
/// assert_eq!(instance.num_locations(), 3);
/// assert_eq!(instance.depot(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemInput {
    /// Coordinates of every location, depot included.
    pub locations: Vec<Coordinate>,
    /// Index of the depot within `locations`.
    #[serde(default)]
    pub depot: usize,
    /// Demand per location; the depot's must be 0.
    pub demands: Vec<i64>,
    /// Fleet size.
    pub num_vehicles: usize,
    /// Vehicle capacity (uniform or per vehicle).
    pub capacity: CapacitySpec,
}

/// GPS coordinates of the sample instance (central Sydney), depot first.
const SAMPLE_LOCATIONS: [(f64, f64); 13] = [
    (-33.881656, 151.205913),
    (-33.873199, 151.208848),
    (-33.863333, 151.206831),
    (-33.875752, 151.218998),
    (-33.869785, 151.193664),
    (-33.891927, 151.211595),
    (-33.878716, 151.199230),
    (-33.892750, 151.203915),
    (-33.877291, 151.190818),
    (-33.873967, 151.236424),
    (-33.868141, 151.211221),
    (-33.836186, 151.207338),
    (-33.837004, 151.224960),
];

const SAMPLE_NUM_VEHICLES: usize = 3;
const SAMPLE_CAPACITY: i64 = 15;
const SAMPLE_MAX_DEMAND: i64 = 8;

/// Returns the coordinates of the sample instance, depot first.
pub fn sample_locations() -> Vec<Coordinate> {
    SAMPLE_LOCATIONS.iter().copied().map(Coordinate::from).collect()
}

impl ProblemInput {
    /// Builds a deterministic sample problem.
    ///
    /// Uses the 13 sample locations with depot 0, demands drawn uniformly
    /// from `1..=8` with a generator seeded by `seed`, and 3 vehicles of
    /// capacity 15.
    pub fn sample(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let locations = sample_locations();
        let demands = (0..locations.len())
            .map(|i| {
                if i == 0 {
                    0
                } else {
                    rng.random_range(1..=SAMPLE_MAX_DEMAND)
                }
            })
            .collect();

        Self {
            locations,
            depot: 0,
            demands,
            num_vehicles: SAMPLE_NUM_VEHICLES,
            capacity: CapacitySpec::Uniform(SAMPLE_CAPACITY),
        }
    }
}

/// A validated, immutable CVRP instance.
///
/// # Examples
///
/// ```
/// use u_cvrp::models::{Coordinate, ProblemInstance};
///
/// let instance = ProblemInstance::uniform(
///     vec![Coordinate::new(0.0, 0.0), Coordinate::new(3.0, 4.0)],
///     vec![0, 5],
///     2,
///     10,
/// ).unwrap();
/// assert_eq!(instance.num_vehicles(), 2);
/// assert_eq!(instance.demand(1), 5);
/// assert_eq!(instance.stops().collect::<Vec<_>>(), vec![1]);
/// ```
#[derive(Debug, Clone)]
pub struct ProblemInstance {
    locations: Vec<Location>,
    depot: usize,
    vehicles: Vec<Vehicle>,
}

impl ProblemInstance {
    /// Validates a raw description.
    ///
    /// # Errors
    ///
    /// Returns an [`InstanceError`] if the description is malformed: no
    /// locations, depot out of range, demand list length mismatch, nonzero
    /// depot demand, negative demand, no vehicles, negative capacity,
    /// capacity list length mismatch, or a non-finite coordinate.
    pub fn new(input: ProblemInput) -> Result<Self, InstanceError> {
        let ProblemInput {
            locations,
            depot,
            demands,
            num_vehicles,
            capacity,
        } = input;

        if locations.is_empty() {
            return Err(InstanceError::NoLocations);
        }
        if depot >= locations.len() {
            return Err(InstanceError::DepotOutOfRange {
                depot,
                locations: locations.len(),
            });
        }
        if demands.len() != locations.len() {
            return Err(InstanceError::DemandLengthMismatch {
                demands: demands.len(),
                locations: locations.len(),
            });
        }
        if demands[depot] != 0 {
            return Err(InstanceError::DepotDemandNonZero {
                demand: demands[depot],
            });
        }
        if let Some(location) = locations.iter().position(|c| !c.is_finite()) {
            return Err(InstanceError::NonFiniteCoordinate { location });
        }
        if num_vehicles == 0 {
            return Err(InstanceError::NoVehicles);
        }

        let capacities = match capacity {
            CapacitySpec::Uniform(c) => vec![c; num_vehicles],
            CapacitySpec::PerVehicle(cs) => {
                if cs.len() != num_vehicles {
                    return Err(InstanceError::CapacityLengthMismatch {
                        capacities: cs.len(),
                        vehicles: num_vehicles,
                    });
                }
                cs
            }
        };

        let vehicles = capacities
            .into_iter()
            .enumerate()
            .map(|(vehicle, capacity)| {
                u64::try_from(capacity)
                    .map(|c| Vehicle::new(vehicle, c))
                    .map_err(|_| InstanceError::NegativeCapacity { vehicle, capacity })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let locations = locations
            .into_iter()
            .zip(demands)
            .enumerate()
            .map(|(location, (coordinate, demand))| {
                u64::try_from(demand)
                    .map(|d| Location::new(location, coordinate, d))
                    .map_err(|_| InstanceError::NegativeDemand { location, demand })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            locations,
            depot,
            vehicles,
        })
    }

    /// Builds an instance with depot 0 and a homogeneous fleet.
    ///
    /// # Errors
    ///
    /// Same as [`ProblemInstance::new`].
    pub fn uniform(
        locations: Vec<Coordinate>,
        demands: Vec<i64>,
        num_vehicles: usize,
        capacity: i64,
    ) -> Result<Self, InstanceError> {
        Self::new(ProblemInput {
            locations,
            depot: 0,
            demands,
            num_vehicles,
            capacity: CapacitySpec::Uniform(capacity),
        })
    }

    /// All locations, indexed by location index.
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Number of locations, depot included.
    pub fn num_locations(&self) -> usize {
        self.locations.len()
    }

    /// Depot index.
    pub fn depot(&self) -> usize {
        self.depot
    }

    /// The fleet, indexed by vehicle ID.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Fleet size.
    pub fn num_vehicles(&self) -> usize {
        self.vehicles.len()
    }

    /// Demand of `location`.
    ///
    /// # Panics
    ///
    /// Panics if `location` is out of range.
    pub fn demand(&self, location: usize) -> u64 {
        self.locations[location].demand()
    }

    /// Capacity of `vehicle`.
    ///
    /// # Panics
    ///
    /// Panics if `vehicle` is out of range.
    pub fn capacity(&self, vehicle: usize) -> u64 {
        self.vehicles[vehicle].capacity()
    }

    /// Coordinate of `location`.
    pub fn coordinate(&self, location: usize) -> Coordinate {
        self.locations[location].coordinate()
    }

    /// Indices of all non-depot locations, ascending.
    pub fn stops(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.locations.len()).filter(move |&i| i != self.depot)
    }

    /// Sum of all demands, widened so that it cannot overflow.
    pub fn total_demand(&self) -> u128 {
        self.locations.iter().map(|l| u128::from(l.demand())).sum()
    }

    /// Sum of all vehicle capacities, widened so that it cannot overflow.
    pub fn fleet_capacity(&self) -> u128 {
        self.vehicles.iter().map(|v| u128::from(v.capacity())).sum()
    }

    /// Largest single vehicle capacity.
    pub fn max_capacity(&self) -> u64 {
        self.vehicles
            .iter()
            .map(|v| v.capacity())
            .max()
            .unwrap_or(0)
    }
}
