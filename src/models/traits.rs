use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;

use super::types::{CallError, ProviderId};

/// Capability to run a single-turn generation against a provider model
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelCaller: Send + Sync {
    /// Send `prompt` to `model_id` and return the free-form text reply
    async fn generate(
        &self,
        provider: ProviderId,
        api_key: &str,
        model_id: &str,
        prompt: &str,
        timeout: Duration,
    ) -> Result<String, CallError>;
}

/// Capability to ask a provider which model ids it currently serves
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelLister: Send + Sync {
    async fn list_models(
        &self,
        provider: ProviderId,
        api_key: &str,
        timeout: Duration,
    ) -> Result<HashSet<String>, CallError>;
}
