use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::router::Router;
use crate::constants::FALLBACK_MARKER;
use crate::models::{CallError, ModelCaller, ModelDescriptor, ModelRegistry};
use crate::session::Session;
use crate::vault::{CredentialStore, HistoryEntry, StorageError};

/// Called with the failed target and its error just before the failover attempt
pub type FailoverCallback = Arc<dyn Fn(&ModelDescriptor, &CallError) + Send + Sync>;

/// Both the chosen model and the failover model failed for one prompt
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error(
        "{primary_model} failed ({primary}); failover {fallback_model} also failed ({fallback})"
    )]
    FailoverExhausted {
        primary_model: String,
        primary: CallError,
        fallback_model: String,
        fallback: CallError,
    },
}

/// Result of one executed prompt
#[derive(Debug)]
pub struct ExecutionOutcome {
    /// The model that actually produced `response`
    pub model: ModelDescriptor,
    pub response: String,
    pub failed_over: bool,
    /// Set when the reply arrived but the record could not be rewritten.
    /// The entry stays in session history and goes out with the next write.
    pub persist_error: Option<StorageError>,
}

/// Runs prompts against the routed model with a single failover retry
pub struct ExecutionEngine {
    registry: Arc<ModelRegistry>,
    router: Router,
    caller: Arc<dyn ModelCaller>,
    store: CredentialStore,
    generation_timeout: Duration,
    on_failover: Option<FailoverCallback>,
}

impl ExecutionEngine {
    pub fn new(
        registry: Arc<ModelRegistry>,
        router: Router,
        caller: Arc<dyn ModelCaller>,
        store: CredentialStore,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            router,
            caller,
            store,
            generation_timeout,
            on_failover: None,
        }
    }

    pub fn with_failover_callback(mut self, callback: FailoverCallback) -> Self {
        self.on_failover = Some(callback);
        self
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Route, call, fail over once if needed, then record and persist
    pub async fn execute(
        &self,
        session: &mut Session,
        prompt: &str,
    ) -> Result<ExecutionOutcome, ExecutionError> {
        let target = self
            .router
            .select_target(session, prompt, self.caller.as_ref())
            .await;
        debug!("Executing on {} ({})", target.display_name, target.model_id);

        let (model, response, failed_over) = match self.call(session, &target, prompt).await {
            Ok(response) => (target, response, false),
            Err(primary) => {
                warn!("{} failed: {}. Failing over", target.display_name, primary);
                if let Some(callback) = &self.on_failover {
                    callback(&target, &primary);
                }

                let fallback = self.registry.failover_target().clone();
                let marked = format!("{}{}", FALLBACK_MARKER, prompt);

                match self.call(session, &fallback, &marked).await {
                    Ok(response) => (fallback, response, true),
                    Err(fallback_err) => {
                        warn!("Failover {} failed: {}", fallback.display_name, fallback_err);
                        return Err(ExecutionError::FailoverExhausted {
                            primary_model: target.display_name,
                            primary,
                            fallback_model: fallback.display_name,
                            fallback: fallback_err,
                        });
                    }
                }
            }
        };

        session.append_history(HistoryEntry::now(prompt, &response, &model.display_name));
        let persist_error = self.store.persist(session.record()).err();
        if let Some(e) = &persist_error {
            warn!("Failed to persist history: {}", e);
        }

        Ok(ExecutionOutcome {
            model,
            response,
            failed_over,
            persist_error,
        })
    }

    async fn call(
        &self,
        session: &Session,
        model: &ModelDescriptor,
        prompt: &str,
    ) -> Result<String, CallError> {
        self.caller
            .generate(
                model.provider,
                session.api_key(model.provider),
                &model.model_id,
                prompt,
                self.generation_timeout,
            )
            .await
    }
}
