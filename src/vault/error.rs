use std::path::PathBuf;
use thiserror::Error;

/// Failures reading or writing the persisted record
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("record is corrupt: {0}")]
    Corrupt(String),

    #[error("record failed validation: {0}")]
    Invalid(String),

    #[error("failed to serialize record: {0}")]
    Serialize(String),

    #[error("could not determine home directory")]
    NoHome,
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures of the passcode gate
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("access denied after {attempts} failed attempts")]
    Denied { attempts: usize },

    #[error("could not read passcode: {0}")]
    Prompt(#[from] std::io::Error),
}
