use chrono::Local;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use super::error::StorageError;
use crate::constants::RECORD_SCHEMA_VERSION;
use crate::models::ProviderId;

/// One-way SHA-256 digest of the operator passcode, hex encoded
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasscodeHash(String);

impl PasscodeHash {
    pub fn from_passcode(passcode: &str) -> Self {
        Self(hex::encode(Sha256::digest(passcode.as_bytes())))
    }

    /// Compare a candidate passcode against this digest in constant time
    pub fn verify(&self, passcode: &str) -> bool {
        let candidate = Self::from_passcode(passcode);
        let (a, b) = (self.0.as_bytes(), candidate.0.as_bytes());
        if a.len() != b.len() {
            return false;
        }
        a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_well_formed(&self) -> bool {
        self.0.len() == 64
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }
}

// Digests stay out of logs and debug dumps
impl fmt::Debug for PasscodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasscodeHash(<redacted>)")
    }
}

/// Passcode digest plus one key slot per provider
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "hash")]
    pub passcode_hash: PasscodeHash,
    #[serde(rename = "g_key")]
    google_key: String,
    #[serde(rename = "q_key")]
    groq_key: String,
}

impl Credentials {
    pub fn new(passcode: &str, google_key: &str, groq_key: &str) -> Self {
        Self {
            passcode_hash: PasscodeHash::from_passcode(passcode),
            google_key: google_key.trim().to_string(),
            groq_key: groq_key.trim().to_string(),
        }
    }

    pub fn key_for(&self, provider: ProviderId) -> &str {
        match provider {
            ProviderId::Google => &self.google_key,
            ProviderId::Groq => &self.groq_key,
        }
    }

    pub fn set_key(&mut self, provider: ProviderId, key: &str) {
        let slot = match provider {
            ProviderId::Google => &mut self.google_key,
            ProviderId::Groq => &mut self.groq_key,
        };
        *slot = key.trim().to_string();
    }

    pub fn is_configured(&self, provider: ProviderId) -> bool {
        !self.key_for(provider).is_empty()
    }

    pub fn set_passcode(&mut self, passcode: &str) {
        self.passcode_hash = PasscodeHash::from_passcode(passcode);
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("google_configured", &self.is_configured(ProviderId::Google))
            .field("groq_configured", &self.is_configured(ProviderId::Groq))
            .finish()
    }
}

/// One completed exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub time: String,
    #[serde(rename = "user")]
    pub prompt: String,
    #[serde(rename = "ai")]
    pub response: String,
    #[serde(rename = "model")]
    pub model_name: String,
}

impl HistoryEntry {
    /// Stamp an exchange with the current local time, ctime style
    pub fn now(prompt: &str, response: &str, model_name: &str) -> Self {
        Self {
            time: Local::now().format("%a %b %e %H:%M:%S %Y").to_string(),
            prompt: prompt.to_string(),
            response: response.to_string(),
            model_name: model_name.to_string(),
        }
    }
}

fn default_version() -> u32 {
    RECORD_SCHEMA_VERSION
}

/// The whole persisted document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(flatten)]
    pub credentials: Credentials,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Record {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            version: RECORD_SCHEMA_VERSION,
            credentials,
            history: Vec::new(),
        }
    }

    /// Decode and validate a persisted document
    pub fn decode(raw: &str) -> Result<Self, StorageError> {
        let record: Record =
            serde_json::from_str(raw).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        record.validate()?;
        Ok(record)
    }

    pub fn encode(&self) -> Result<String, StorageError> {
        serde_json::to_string_pretty(self).map_err(|e| StorageError::Serialize(e.to_string()))
    }

    fn validate(&self) -> Result<(), StorageError> {
        if self.version > RECORD_SCHEMA_VERSION {
            return Err(StorageError::Invalid(format!(
                "record schema version {} is newer than supported version {}",
                self.version, RECORD_SCHEMA_VERSION
            )));
        }
        if !self.credentials.passcode_hash.is_well_formed() {
            return Err(StorageError::Invalid(
                "passcode hash is not a SHA-256 hex digest".to_string(),
            ));
        }
        Ok(())
    }
}
