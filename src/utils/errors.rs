use thiserror::Error;

use crate::models::CallError;
use crate::routing::ExecutionError;
use crate::vault::{AuthError, StorageError};

/// Main error type for Neurolink
#[derive(Error, Debug)]
pub enum NeurolinkError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Model call error: {0}")]
    Call(#[from] CallError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Registry error: {0}")]
    RegistryError(String),
}
