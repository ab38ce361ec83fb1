// Gateway module for routing - follows the Train Station Pattern
// All external access must go through this gateway

mod engine;
mod probe;
mod router;

pub use engine::{ExecutionEngine, ExecutionError, ExecutionOutcome, FailoverCallback};
pub use probe::{Availability, StatusProbe};
pub use router::{parse_classification, Router};
