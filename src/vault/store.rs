use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::error::StorageError;
use super::record::{Credentials, Record};
use crate::constants::RECORD_FILE_NAME;

/// Owner of the single persisted record
///
/// Every write replaces the whole document through a temporary sibling file
/// and a rename, so a crash mid-write leaves the previous record intact.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location under the operator's home directory
    pub fn at_default_location() -> Result<Self, StorageError> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn default_path() -> Result<PathBuf, StorageError> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(RECORD_FILE_NAME))
            .ok_or(StorageError::NoHome)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record. `Ok(None)` means first run.
    pub fn load(&self) -> Result<Option<Record>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No record at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        Record::decode(&raw).map(Some)
    }

    /// Create the first record with an empty history
    pub fn initialize(
        &self,
        passcode: &str,
        google_key: &str,
        groq_key: &str,
    ) -> Result<Record, StorageError> {
        let record = Record::new(Credentials::new(passcode, google_key, groq_key));
        self.persist(&record)?;
        info!("Initialized record at {}", self.path.display());
        Ok(record)
    }

    /// Rewrite the full record atomically
    pub fn persist(&self, record: &Record) -> Result<(), StorageError> {
        let encoded = record.encode()?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
            }
        }

        let tmp_path = self.temp_path();
        let mut tmp_file = create_private(&tmp_path).map_err(|e| StorageError::io(&tmp_path, e))?;
        tmp_file
            .write_all(encoded.as_bytes())
            .and_then(|_| tmp_file.sync_all())
            .map_err(|e| StorageError::io(&tmp_path, e))?;
        drop(tmp_file);

        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StorageError::io(&self.path, e));
        }

        debug!(
            "Persisted record ({} history entries) to {}",
            record.history.len(),
            self.path.display()
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| RECORD_FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(unix)]
fn create_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
