use crate::models::{ModelDescriptor, ProviderId};
use crate::vault::{Credentials, HistoryEntry, Record};

/// How the target model is chosen for each prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingMode {
    /// Classify every prompt and pick from the registry
    Auto,
    /// Always use the pinned model
    Manual(ModelDescriptor),
}

impl RoutingMode {
    pub fn label(&self) -> &'static str {
        match self {
            RoutingMode::Auto => "AUTO",
            RoutingMode::Manual(_) => "MANUAL",
        }
    }
}

/// In-memory state of one unlocked run
///
/// Owns the unlocked record; every mutation of persisted fields must be
/// flushed through the credential store before the next prompt.
#[derive(Debug, Clone)]
pub struct Session {
    record: Record,
    mode: RoutingMode,
}

impl Session {
    pub fn new(record: Record) -> Self {
        Self {
            record,
            mode: RoutingMode::Auto,
        }
    }

    pub fn mode(&self) -> &RoutingMode {
        &self.mode
    }

    pub fn pin(&mut self, model: ModelDescriptor) {
        self.mode = RoutingMode::Manual(model);
    }

    pub fn set_auto(&mut self) {
        self.mode = RoutingMode::Auto;
    }

    pub fn credentials(&self) -> &Credentials {
        &self.record.credentials
    }

    pub fn api_key(&self, provider: ProviderId) -> &str {
        self.record.credentials.key_for(provider)
    }

    pub fn set_key(&mut self, provider: ProviderId, key: &str) {
        self.record.credentials.set_key(provider, key);
    }

    pub fn set_passcode(&mut self, passcode: &str) {
        self.record.credentials.set_passcode(passcode);
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.record.history
    }

    /// The most recent `limit` entries, oldest first
    pub fn recent_history(&self, limit: usize) -> &[HistoryEntry] {
        let history = &self.record.history;
        &history[history.len().saturating_sub(limit)..]
    }

    pub fn append_history(&mut self, entry: HistoryEntry) {
        self.record.history.push(entry);
    }

    /// The full document to hand to the store
    pub fn record(&self) -> &Record {
        &self.record
    }
}
