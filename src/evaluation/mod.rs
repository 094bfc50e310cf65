//! Capacity bookkeeping, route evaluation, and feasibility checking.

mod capacity;
mod evaluator;

pub use capacity::CapacityTracker;
pub use evaluator::RouteEvaluator;
