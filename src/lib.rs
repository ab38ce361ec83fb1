pub mod app;
pub mod cli;
pub mod constants;
pub mod display;
pub mod models;
pub mod routing;
pub mod runtime;
pub mod session;
pub mod utils;
pub mod vault;

pub use app::{load_config, Config};
pub use models::{ModelDescriptor, ModelRegistry, ProviderId};
pub use routing::{ExecutionEngine, Router, StatusProbe};
pub use session::Session;
pub use utils::NeurolinkError;
pub use vault::{AuthGate, CredentialStore};
