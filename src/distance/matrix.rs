//! Memoizing distance matrix backed by a distance oracle.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fxhash::FxHashMap;
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use tracing::debug;

use super::DistanceOracle;
use crate::error::{OracleError, RoutingError};
use crate::models::{Coordinate, ProblemInstance};

/// A lazily filled n×n cost matrix over a [`DistanceOracle`].
///
/// Each ordered pair `(from, to)` is fetched from the oracle at most once;
/// later lookups are answered from the cache. The diagonal is always 0 and
/// never reaches the oracle. The matrix is not assumed symmetric.
///
/// One matrix is scoped to one solve: it borrows the oracle and copies the
/// instance coordinates, and is dropped with the solve.
///
/// # Examples
///
/// ```
/// use u_cvrp::models::{Coordinate, ProblemInstance};
/// use u_cvrp::distance::{DistanceMatrix, EuclideanOracle};
///
/// let instance = ProblemInstance::uniform(
///     vec![Coordinate::new(0.0, 0.0), Coordinate::new(3.0, 4.0)],
///     vec![0, 1],
///     1,
///     10,
/// ).unwrap();
/// let oracle = EuclideanOracle::default();
/// let dm = DistanceMatrix::new(&instance, &oracle);
///
/// assert!((dm.cost(0, 1).unwrap() - 5.0).abs() < 1e-10);
/// assert!((dm.cost(0, 1).unwrap() - 5.0).abs() < 1e-10);
/// assert_eq!(dm.cost(1, 1).unwrap(), 0.0);
/// assert_eq!(dm.oracle_calls(), 1);
/// ```
pub struct DistanceMatrix<'a> {
    coordinates: Vec<Coordinate>,
    oracle: &'a dyn DistanceOracle,
    cache: RwLock<FxHashMap<(usize, usize), f64>>,
    /// One slot per pair currently being fetched.
    in_flight: Mutex<FxHashMap<(usize, usize), Arc<Mutex<()>>>>,
    oracle_calls: AtomicUsize,
}

impl std::fmt::Debug for DistanceMatrix<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistanceMatrix")
            .field("size", &self.coordinates.len())
            .field("cached_pairs", &self.cached_pairs())
            .field("oracle_calls", &self.oracle_calls())
            .finish()
    }
}

impl<'a> DistanceMatrix<'a> {
    /// Creates an empty matrix for the locations of `instance`.
    pub fn new(instance: &ProblemInstance, oracle: &'a dyn DistanceOracle) -> Self {
        Self::from_coordinates(
            instance.locations().iter().map(|l| l.coordinate()).collect(),
            oracle,
        )
    }

    /// Creates an empty matrix over explicit coordinates.
    pub fn from_coordinates(coordinates: Vec<Coordinate>, oracle: &'a dyn DistanceOracle) -> Self {
        Self {
            coordinates,
            oracle,
            cache: RwLock::new(FxHashMap::default()),
            in_flight: Mutex::new(FxHashMap::default()),
            oracle_calls: AtomicUsize::new(0),
        }
    }

    /// Returns the travel cost from location `from` to location `to`.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::OracleUnavailable`] if the oracle fails or
    /// answers with a negative or non-finite cost.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn cost(&self, from: usize, to: usize) -> Result<f64, RoutingError> {
        if from == to {
            return Ok(0.0);
        }
        if let Some(&cost) = self.cache.read().get(&(from, to)) {
            return Ok(cost);
        }

        // Callers missing the same pair queue on its slot; other pairs proceed.
        let slot = Arc::clone(self.in_flight.lock().entry((from, to)).or_default());
        let _fetching = slot.lock();
        let cached = self.cache.read().get(&(from, to)).copied();
        let result = match cached {
            Some(cost) => Ok(cost),
            None => self
                .fetch(from, to)
                .map(|cost| *self.cache.write().entry((from, to)).or_insert(cost)),
        };

        let mut in_flight = self.in_flight.lock();
        if in_flight
            .get(&(from, to))
            .is_some_and(|current| Arc::ptr_eq(current, &slot))
        {
            in_flight.remove(&(from, to));
        }
        result
    }

    /// Fetches every uncached off-diagonal pair, in parallel.
    ///
    /// Successful fetches are committed even if another pair fails; the
    /// error reported is the failing pair with the lowest `(from, to)`.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::OracleUnavailable`] if any pair fails.
    pub fn prefetch(&self) -> Result<(), RoutingError> {
        let n = self.coordinates.len();
        let missing: Vec<(usize, usize)> = {
            let cache = self.cache.read();
            (0..n)
                .flat_map(|i| (0..n).map(move |j| (i, j)))
                .filter(|&(i, j)| i != j && !cache.contains_key(&(i, j)))
                .collect()
        };
        debug!(pairs = missing.len(), "prefetching distance matrix");

        let fetched: Vec<Result<f64, RoutingError>> =
            missing.par_iter().map(|&(i, j)| self.cost(i, j)).collect();

        match fetched.into_iter().find_map(Result::err) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Distance of `depot → stops[0] → ... → stops[n-1] → depot`.
    ///
    /// An empty route has distance 0.
    ///
    /// # Errors
    ///
    /// Propagates [`RoutingError::OracleUnavailable`].
    pub fn route_distance(&self, stops: &[usize], depot: usize) -> Result<f64, RoutingError> {
        let (Some(&first), Some(&last)) = (stops.first(), stops.last()) else {
            return Ok(0.0);
        };
        let mut dist = self.cost(depot, first)?;
        for w in stops.windows(2) {
            dist += self.cost(w[0], w[1])?;
        }
        dist += self.cost(last, depot)?;
        Ok(dist)
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.coordinates.len()
    }

    /// Number of oracle invocations made so far.
    pub fn oracle_calls(&self) -> usize {
        self.oracle_calls.load(Ordering::Relaxed)
    }

    /// Number of ordered pairs currently cached.
    pub fn cached_pairs(&self) -> usize {
        self.cache.read().len()
    }

    fn fetch(&self, from: usize, to: usize) -> Result<f64, RoutingError> {
        self.oracle_calls.fetch_add(1, Ordering::Relaxed);
        let unavailable = |source| RoutingError::OracleUnavailable { from, to, source };

        let cost = self
            .oracle
            .fetch_distance(self.coordinates[from], self.coordinates[to])
            .map_err(unavailable)?;
        if !cost.is_finite() || cost < 0.0 {
            return Err(unavailable(OracleError::InvalidCost(cost)));
        }
        Ok(cost)
    }
}
