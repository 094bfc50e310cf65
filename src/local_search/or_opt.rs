//! Intra-route Or-opt improvement.
//!
//! # Algorithm
//!
//! Tries moving segments of 1, 2, or 3 consecutive stops to a different
//! position within the same route, keeping their orientation. Accepts moves
//! that reduce total distance.
//!
//! For each segment size k ∈ {1, 2, 3} and each starting position, the
//! segment is lifted out and its reinsertion is priced on the remaining
//! route, so every affected edge is counted in its travel direction.
//!
//! # Complexity
//!
//! O(n²) per pass, O(n³) worst case for convergence.
//!
//! # Reference
//!
//! Or, I. (1976). "Traveling Salesman-Type Combinatorial Problems and Their
//! Relation to the Logistics of Blood Banking". PhD thesis.

use crate::distance::DistanceMatrix;
use crate::error::RoutingError;

use super::EPS;

/// Applies Or-opt improvement to a single route.
///
/// Tries relocating segments of 1, 2, and 3 stops to better positions.
/// Returns the improved stop sequence and total distance.
///
/// # Errors
///
/// Propagates [`RoutingError::OracleUnavailable`].
///
/// # Examples
///
/// ```
/// use u_cvrp::models::Coordinate;
/// use u_cvrp::distance::{DistanceMatrix, EuclideanOracle};
/// use u_cvrp::local_search::or_opt_improve;
///
/// let oracle = EuclideanOracle::default();
/// let dm = DistanceMatrix::from_coordinates(
///     vec![
///         Coordinate::new(0.0, 0.0),
///         Coordinate::new(1.0, 1.0),
///         Coordinate::new(2.0, 0.0),
///         Coordinate::new(1.0, -1.0),
///     ],
///     &oracle,
/// );
///
/// let (improved, dist) = or_opt_improve(&[1, 3, 2], 0, &dm).unwrap();
/// let orig_dist = dm.route_distance(&[1, 3, 2], 0).unwrap();
/// assert!(dist < orig_dist);
/// assert_eq!(improved.len(), 3);
/// ```
pub fn or_opt_improve(
    route: &[usize],
    depot: usize,
    distances: &DistanceMatrix<'_>,
) -> Result<(Vec<usize>, f64), RoutingError> {
    let mut current = route.to_vec();
    let mut improved = current.len() >= 2;

    while improved {
        improved = false;

        for seg_len in 1..=3.min(current.len() - 1) {
            if try_or_opt_pass(&mut current, depot, distances, seg_len)? {
                improved = true;
            }
        }
    }

    let dist = distances.route_distance(&current, depot)?;
    Ok((current, dist))
}

/// One pass of Or-opt for a given segment length. Returns true if improved.
fn try_or_opt_pass(
    route: &mut Vec<usize>,
    depot: usize,
    distances: &DistanceMatrix<'_>,
    seg_len: usize,
) -> Result<bool, RoutingError> {
    let n = route.len();
    if n < seg_len + 1 {
        return Ok(false);
    }

    let mut best: Option<(usize, usize, f64)> = None;

    for from in 0..=(n - seg_len) {
        let prev = if from == 0 { depot } else { route[from - 1] };
        let after = if from + seg_len == n {
            depot
        } else {
            route[from + seg_len]
        };
        let seg_first = route[from];
        let seg_last = route[from + seg_len - 1];

        // Old edges: prev→seg_first + seg_last→after
        // New edges (after removal): prev→after
        let removal_gain = distances.cost(prev, seg_first)? + distances.cost(seg_last, after)?
            - distances.cost(prev, after)?;

        let reduced: Vec<usize> = route[..from]
            .iter()
            .chain(&route[from + seg_len..])
            .copied()
            .collect();

        for to in 0..=reduced.len() {
            if to == from {
                continue;
            }
            let ins_prev = if to == 0 { depot } else { reduced[to - 1] };
            let ins_next = if to == reduced.len() {
                depot
            } else {
                reduced[to]
            };

            let insertion_cost = distances.cost(ins_prev, seg_first)?
                + distances.cost(seg_last, ins_next)?
                - distances.cost(ins_prev, ins_next)?;
            let delta = insertion_cost - removal_gain;

            if delta < -EPS && best.is_none_or(|(_, _, d)| delta < d - EPS) {
                best = Some((from, to, delta));
            }
        }
    }

    let Some((from, to, _)) = best else {
        return Ok(false);
    };

    // `to` indexes the route with the segment already removed.
    let segment: Vec<usize> = route.drain(from..from + seg_len).collect();
    route.splice(to..to, segment);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::EuclideanOracle;
    use crate::models::Coordinate;

    fn line(n: usize) -> Vec<Coordinate> {
        (0..n).map(|i| Coordinate::new(i as f64, 0.0)).collect()
    }

    #[test]
    fn test_or_opt_already_optimal() {
        let oracle = EuclideanOracle::default();
        let dm = DistanceMatrix::from_coordinates(line(4), &oracle);
        let (improved, dist) = or_opt_improve(&[1, 2, 3], 0, &dm).expect("ok");
        assert_eq!(improved, vec![1, 2, 3]);
        assert!((dist - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_or_opt_empty_and_single() {
        let oracle = EuclideanOracle::default();
        let dm = DistanceMatrix::from_coordinates(line(4), &oracle);
        let (improved, dist) = or_opt_improve(&[], 0, &dm).expect("ok");
        assert!(improved.is_empty());
        assert_eq!(dist, 0.0);
        let (improved, dist) = or_opt_improve(&[2], 0, &dm).expect("ok");
        assert_eq!(improved, vec![2]);
        assert!((dist - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_or_opt_moves_stray_stop() {
        // 0→1→3→2→4→0 on a line; moving 3 after 2 gives the straight sweep.
        let oracle = EuclideanOracle::default();
        let dm = DistanceMatrix::from_coordinates(line(5), &oracle);
        let (improved, dist) = or_opt_improve(&[1, 3, 2, 4], 0, &dm).expect("ok");
        assert!((dist - 8.0).abs() < 1e-10);
        assert!((dm.route_distance(&improved, 0).expect("ok") - dist).abs() < 1e-10);
    }

    #[test]
    fn test_or_opt_does_not_worsen() {
        let oracle = EuclideanOracle::default();
        let dm = DistanceMatrix::from_coordinates(
            vec![
                Coordinate::new(5.0, 5.0),
                Coordinate::new(0.0, 0.0),
                Coordinate::new(10.0, 0.0),
                Coordinate::new(0.0, 10.0),
                Coordinate::new(10.0, 10.0),
            ],
            &oracle,
        );
        let initial = [1, 4, 2, 3];
        let initial_dist = dm.route_distance(&initial, 0).expect("ok");
        let (improved, improved_dist) = or_opt_improve(&initial, 0, &dm).expect("ok");
        assert!(improved_dist <= initial_dist + 1e-10);
        let mut sorted = improved.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3, 4]);
    }
}
