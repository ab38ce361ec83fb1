use dialoguer::{Input, Password};
use std::io;
use tracing::{info, warn};

use super::error::{AuthError, StorageError};
use super::record::{Credentials, Record};
use super::store::CredentialStore;
use crate::constants::MAX_UNLOCK_ATTEMPTS;
use crate::models::ProviderId;

/// Source of operator input
pub trait Prompter {
    /// Read input without echoing it
    fn secret(&mut self, prompt: &str) -> io::Result<String>;

    /// Read a visible line of input
    fn line(&mut self, prompt: &str) -> io::Result<String>;

    /// Show a short notice to the operator
    fn notice(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Interactive terminal prompts
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn secret(&mut self, prompt: &str) -> io::Result<String> {
        Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(into_io)
    }

    fn line(&mut self, prompt: &str) -> io::Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(into_io)
    }
}

fn into_io(err: dialoguer::Error) -> io::Error {
    io::Error::other(err)
}

/// Why setup could not complete
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Prompt(#[from] io::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Passcode gate in front of the credential record
pub struct AuthGate<'a, P: Prompter> {
    prompter: &'a mut P,
    max_attempts: usize,
}

impl<'a, P: Prompter> AuthGate<'a, P> {
    pub fn new(prompter: &'a mut P) -> Self {
        Self {
            prompter,
            max_attempts: MAX_UNLOCK_ATTEMPTS,
        }
    }

    /// Ask for the passcode until it matches or the attempts run out
    ///
    /// Every run starts with a fresh allowance; nothing about failed
    /// attempts is persisted.
    pub fn unlock(&mut self, record: &Record) -> Result<Credentials, AuthError> {
        for attempt in 1..=self.max_attempts {
            let prompt = format!("Passcode ({}/{})", attempt, self.max_attempts);
            let candidate = self.prompter.secret(&prompt)?;

            if record.credentials.passcode_hash.verify(&candidate) {
                info!("Unlocked on attempt {}", attempt);
                return Ok(record.credentials.clone());
            }

            warn!("Passcode attempt {} rejected", attempt);
            self.prompter.notice("Denied.");
        }

        Err(AuthError::Denied {
            attempts: self.max_attempts,
        })
    }

    /// Ask for a new passcode and its confirmation until they agree
    pub fn read_new_passcode(&mut self) -> io::Result<String> {
        loop {
            let first = self.prompter.secret("Set Passcode")?;
            let second = self.prompter.secret("Confirm Passcode")?;
            if first == second {
                return Ok(first);
            }
            self.prompter.notice("Mismatched passcodes!");
        }
    }

    /// Read a provider key; blank leaves the provider unconfigured
    pub fn read_key(&mut self, provider: ProviderId) -> io::Result<String> {
        let key = self
            .prompter
            .secret(&format!("Enter {} API Key (Invisible)", provider.label()))?;
        Ok(key.trim().to_string())
    }

    /// First-run path: passcode, both keys, then the initial record
    pub fn setup(&mut self, store: &CredentialStore) -> Result<Record, SetupError> {
        let passcode = self.read_new_passcode()?;
        let google_key = self.read_key(ProviderId::Google)?;
        let groq_key = self.read_key(ProviderId::Groq)?;

        Ok(store.initialize(&passcode, &google_key, &groq_key)?)
    }
}
