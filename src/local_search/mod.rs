//! Local search operators for improving CVRP solutions.
//!
//! - [`two_opt_improve`] — Intra-route 2-opt segment reversal
//! - [`or_opt_improve`] — Intra-route segment relocation
//! - [`relocate_improve`] — Inter-route stop relocation
//! - [`exchange_improve`] — Inter-route stop swap
//! - [`LocalSearch`] — Budgeted driver combining all four

mod exchange;
mod improver;
mod or_opt;
mod relocate;
mod two_opt;

pub use exchange::exchange_improve;
pub use improver::{LocalSearch, SearchBudget};
pub use or_opt::or_opt_improve;
pub use relocate::{insertion_cost, relocate_improve};
pub use two_opt::two_opt_improve;

/// Minimum distance reduction for a move to count as an improvement.
pub(crate) const EPS: f64 = 1e-10;
