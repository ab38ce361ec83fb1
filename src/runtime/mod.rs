/// Runtime orchestration - Gateway
mod console;
mod non_interactive;
mod orchestrator;

pub use console::{Console, Flow};
pub use non_interactive::{NonInteractiveResult, NonInteractiveRunner};
pub use orchestrator::Orchestrator;
