//! End-to-end solve: instance → matrix → construction → local search → report.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::constructive::cheapest_insertion;
use crate::distance::{DistanceMatrix, DistanceOracle};
use crate::error::RoutingError;
use crate::local_search::{LocalSearch, SearchBudget};
use crate::models::{ProblemInput, ProblemInstance};
use crate::report::{extract, SolutionReport};

/// Solver settings.
///
/// Missing fields take their defaults when deserialized, so `{}` is a valid
/// configuration.
///
/// # Examples
///
/// ```
/// use u_cvrp::solver::SolverConfig;
///
/// let config: SolverConfig = serde_json::from_str(r#"{"time_limit_ms": 250}"#).unwrap();
/// assert!(config.local_search);
/// assert_eq!(config.max_iterations, Some(10_000));
/// assert_eq!(config.time_limit_ms, Some(250));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Run local search after construction.
    pub local_search: bool,
    /// Local search pass limit.
    pub max_iterations: Option<usize>,
    /// Local search wall-clock limit in milliseconds.
    pub time_limit_ms: Option<u64>,
    /// Fetch the full distance matrix in parallel before construction.
    pub prefetch: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            local_search: true,
            max_iterations: Some(10_000),
            time_limit_ms: None,
            prefetch: false,
        }
    }
}

impl SolverConfig {
    /// Cheapest insertion only, without an improvement phase.
    pub fn construction_only() -> Self {
        Self {
            local_search: false,
            ..Self::default()
        }
    }

    /// Local search budget derived from this configuration.
    pub fn search_budget(&self) -> SearchBudget {
        SearchBudget {
            max_iterations: self.max_iterations,
            time_limit: self.time_limit_ms.map(Duration::from_millis),
        }
    }
}

/// Capacitated vehicle routing solver.
///
/// Every call to [`solve`](Self::solve) builds its own [`DistanceMatrix`];
/// nothing is shared between solves.
///
/// # Examples
///
/// ```
/// use u_cvrp::models::{Coordinate, ProblemInstance};
/// use u_cvrp::distance::EuclideanOracle;
/// use u_cvrp::solver::{CvrpSolver, SolverConfig};
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
///
/// let report = CvrpSolver::new(SolverConfig::default())
///     .solve(&instance, &EuclideanOracle::default())
///     .unwrap();
/// assert_eq!(report.routes[0].load, 6);
/// assert_eq!(report.routes[1].load, 6);
/// assert!((report.total_distance - 8.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CvrpSolver {
    config: SolverConfig,
}

impl CvrpSolver {
    /// Creates a solver with the given settings.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Returns the solver settings.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solves a validated instance against `oracle`.
    ///
    /// # Errors
    ///
    /// * [`RoutingError::Infeasible`] if the demands cannot be served.
    /// * [`RoutingError::OracleUnavailable`] if any required distance cannot
    ///   be fetched. No partial report is returned.
    #[instrument(skip_all, fields(locations = instance.num_locations(), vehicles = instance.num_vehicles()))]
    pub fn solve(
        &self,
        instance: &ProblemInstance,
        oracle: &dyn DistanceOracle,
    ) -> Result<SolutionReport, RoutingError> {
        let distances = DistanceMatrix::new(instance, oracle);

        if self.config.prefetch {
            debug!("prefetching distance matrix");
            distances.prefetch()?;
        }

        let mut solution = cheapest_insertion(instance, &distances)?;

        if self.config.local_search {
            solution = LocalSearch::new(self.config.search_budget()).improve(
                instance,
                &distances,
                solution,
            )?;
        }

        let report = extract(instance, &distances, &solution)?;
        info!(
            used_routes = solution.num_used_routes(),
            total_distance = report.total_distance,
            oracle_calls = distances.oracle_calls(),
            "solved"
        );
        Ok(report)
    }

    /// Validates `input` and solves it.
    ///
    /// # Errors
    ///
    /// [`RoutingError::InvalidInstance`] before any distance lookup if the
    /// input is malformed, otherwise as [`solve`](Self::solve).
    pub fn solve_input(
        &self,
        input: ProblemInput,
        oracle: &dyn DistanceOracle,
    ) -> Result<SolutionReport, RoutingError> {
        let instance = ProblemInstance::new(input)?;
        self.solve(&instance, oracle)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::distance::{EuclideanOracle, HaversineOracle};
    use crate::error::{InfeasibleError, InstanceError, OracleError};
    use crate::models::{CapacitySpec, Coordinate};

    fn grid_input() -> ProblemInput {
        ProblemInput {
            locations: vec![
                Coordinate::new(0.0, 0.0),
                Coordinate::new(1.0, 0.0),
                Coordinate::new(2.0, 0.0),
                Coordinate::new(0.0, 1.0),
                Coordinate::new(0.0, 2.0),
            ],
            depot: 0,
            demands: vec![0, 3, 3, 3, 3],
            num_vehicles: 2,
            capacity: CapacitySpec::Uniform(6),
        }
    }

    /// Euclidean oracle that records how often each pair is requested.
    #[derive(Default)]
    struct CountingOracle {
        calls: Mutex<HashMap<(u64, u64, u64, u64), usize>>,
    }

    impl DistanceOracle for CountingOracle {
        fn fetch_distance(&self, from: Coordinate, to: Coordinate) -> Result<f64, OracleError> {
            let key = (from.x.to_bits(), from.y.to_bits(), to.x.to_bits(), to.y.to_bits());
            *self.calls.lock().expect("lock").entry(key).or_default() += 1;
            Ok(((from.x - to.x).powi(2) + (from.y - to.y).powi(2)).sqrt())
        }
    }

    #[test]
    fn test_default_config() {
        let config = SolverConfig::default();
        assert!(config.local_search);
        assert!(!config.prefetch);
        assert_eq!(config.max_iterations, Some(10_000));
        assert_eq!(config.time_limit_ms, None);
        let parsed: SolverConfig = serde_json::from_str("{}").expect("json");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_search_budget_from_config() {
        let config = SolverConfig {
            time_limit_ms: Some(1500),
            max_iterations: None,
            ..SolverConfig::default()
        };
        let budget = config.search_budget();
        assert_eq!(budget.max_iterations, None);
        assert_eq!(budget.time_limit, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_grid_splits_six_six() {
        let report = CvrpSolver::default()
            .solve_input(grid_input(), &EuclideanOracle::default())
            .expect("feasible");
        assert_eq!(report.routes.len(), 2);
        for route in &report.routes {
            assert_eq!(route.load, 6);
            assert_eq!(route.stops.len(), 2);
        }
        assert!((report.total_distance - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_grid_construction_only_is_feasible() {
        let report = CvrpSolver::new(SolverConfig::construction_only())
            .solve_input(grid_input(), &EuclideanOracle::default())
            .expect("feasible");
        assert_eq!(report.routes[0].load, 6);
        assert_eq!(report.routes[1].load, 6);
        assert_eq!(report.routes[0].stops, vec![3, 1]);
        assert_eq!(report.routes[1].stops, vec![4, 2]);
    }

    #[test]
    fn test_single_location_over_capacity() {
        let input = ProblemInput {
            locations: vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)],
            depot: 0,
            demands: vec![0, 10],
            num_vehicles: 1,
            capacity: CapacitySpec::Uniform(5),
        };
        let err = CvrpSolver::default()
            .solve_input(input, &EuclideanOracle::default())
            .expect_err("infeasible");
        assert!(err.is_infeasible());
        assert!(matches!(
            err,
            RoutingError::Infeasible(InfeasibleError::DemandExceedsCapacity { .. })
        ));
    }

    #[test]
    fn test_max_capacity_fleet_solves() {
        let input = |demands: Vec<i64>| ProblemInput {
            locations: (0..demands.len())
                .map(|i| Coordinate::new(i as f64, 0.0))
                .collect(),
            depot: 0,
            demands,
            num_vehicles: 3,
            capacity: CapacitySpec::Uniform(i64::MAX),
        };
        let solver = CvrpSolver::default();
        let oracle = EuclideanOracle::default();

        let report = solver
            .solve_input(input(vec![0, 1, 2]), &oracle)
            .expect("feasible");
        assert_eq!(report.routes.iter().map(|r| r.load).sum::<u64>(), 3);

        let report = solver
            .solve_input(input(vec![0, i64::MAX, i64::MAX, i64::MAX]), &oracle)
            .expect("one full vehicle per stop");
        assert!(report.routes.iter().all(|r| r.load == i64::MAX as u64));

        let err = solver
            .solve_input(input(vec![0, i64::MAX, i64::MAX, i64::MAX, 1]), &oracle)
            .expect_err("one unit over");
        assert!(matches!(
            err,
            RoutingError::Infeasible(InfeasibleError::TotalDemandExceedsFleet { .. })
        ));
    }

    #[test]
    fn test_demand_length_mismatch_never_constructs() {
        let mut input = grid_input();
        input.demands.pop();
        let oracle = CountingOracle::default();
        let err = CvrpSolver::default()
            .solve_input(input, &oracle)
            .expect_err("invalid");
        assert!(matches!(
            err,
            RoutingError::InvalidInstance(InstanceError::DemandLengthMismatch {
                demands: 4,
                locations: 5,
            })
        ));
        assert!(oracle.calls.lock().expect("lock").is_empty());
    }

    #[test]
    fn test_failing_pair_is_oracle_unavailable() {
        let oracle = |a: Coordinate, b: Coordinate| -> Result<f64, OracleError> {
            if a == Coordinate::new(0.0, 2.0) && b == Coordinate::new(0.0, 0.0) {
                return Err(OracleError::Status("OVER_QUERY_LIMIT".into()));
            }
            Ok(((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt())
        };
        let err = CvrpSolver::default()
            .solve_input(grid_input(), &oracle)
            .expect_err("oracle down");
        assert!(matches!(
            err,
            RoutingError::OracleUnavailable {
                from: 4,
                to: 0,
                source: OracleError::Status(_),
            }
        ));
    }

    #[test]
    fn test_failing_pair_aborts_prefetch() {
        let oracle = |a: Coordinate, b: Coordinate| -> Result<f64, OracleError> {
            if a == Coordinate::new(2.0, 0.0) && b == Coordinate::new(1.0, 0.0) {
                return Err(OracleError::Transport("reset".into()));
            }
            Ok((a.x - b.x).abs() + (a.y - b.y).abs())
        };
        let config = SolverConfig {
            prefetch: true,
            ..SolverConfig::default()
        };
        let err = CvrpSolver::new(config)
            .solve_input(grid_input(), &oracle)
            .expect_err("oracle down");
        assert!(matches!(err, RoutingError::OracleUnavailable { from: 2, to: 1, .. }));
    }

    #[test]
    fn test_at_most_one_call_per_pair() {
        let oracle = CountingOracle::default();
        CvrpSolver::default()
            .solve_input(grid_input(), &oracle)
            .expect("feasible");
        let calls = oracle.calls.lock().expect("lock");
        assert!(!calls.is_empty());
        assert!(calls.values().all(|&n| n == 1));
    }

    #[test]
    fn test_prefetch_matches_lazy_solve() {
        let lazy = CvrpSolver::default()
            .solve_input(grid_input(), &EuclideanOracle::default())
            .expect("feasible");
        let config = SolverConfig {
            prefetch: true,
            ..SolverConfig::default()
        };
        let oracle = CountingOracle::default();
        let eager = CvrpSolver::new(config)
            .solve_input(grid_input(), &oracle)
            .expect("feasible");
        assert_eq!(lazy, eager);
        // 5 · 4 ordered off-diagonal pairs.
        assert_eq!(oracle.calls.lock().expect("lock").len(), 20);
    }

    fn sydney_instance(demands: Vec<i64>) -> ProblemInstance {
        ProblemInstance::uniform(crate::models::sample_locations(), demands, 3, 15).expect("valid")
    }

    #[test]
    fn test_solve_is_deterministic() {
        let instance = sydney_instance(vec![0, 1, 2, 3, 1, 2, 3, 1, 2, 3, 1, 2, 3]);
        let solver = CvrpSolver::default();
        let oracle = HaversineOracle;
        let first = solver.solve(&instance, &oracle).expect("feasible");
        let second = solver.solve(&instance, &oracle).expect("feasible");
        assert_eq!(
            first.to_json().expect("json"),
            second.to_json().expect("json")
        );
    }

    #[test]
    fn test_local_search_never_worse_than_construction() {
        let demand_sets = [
            vec![0, 1, 2, 3, 1, 2, 3, 1, 2, 3, 1, 2, 3],
            vec![0, 5, 4, 3, 3, 2, 2, 2, 1, 1, 1, 1, 1],
            vec![0, 6, 1, 5, 2, 4, 3, 1, 1, 1, 1, 1, 1],
        ];
        let oracle = HaversineOracle;
        for demands in demand_sets {
            let instance = sydney_instance(demands);
            let base = CvrpSolver::new(SolverConfig::construction_only())
                .solve(&instance, &oracle)
                .expect("feasible");
            let improved = CvrpSolver::default()
                .solve(&instance, &oracle)
                .expect("feasible");
            assert!(improved.total_distance <= base.total_distance + 1e-9);
            for route in &improved.routes {
                assert!(route.load <= 15);
            }
        }
    }
}
