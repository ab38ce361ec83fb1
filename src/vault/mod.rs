/// Credential vault - Gateway

mod auth;
mod error;
mod record;
mod store;

pub use auth::{AuthGate, Prompter, SetupError, TerminalPrompter};
pub use error::{AuthError, StorageError};
pub use record::{Credentials, HistoryEntry, PasscodeHash, Record};
pub use store::CredentialStore;

#[cfg(test)]
pub(crate) use auth::tests::ScriptedPrompter;
