//! Constructive heuristics for building initial CVRP solutions.
//!
//! - [`cheapest_insertion`] — Deterministic cheapest feasible insertion, O(n²(m + n))

mod cheapest_insertion;

pub use cheapest_insertion::cheapest_insertion;
