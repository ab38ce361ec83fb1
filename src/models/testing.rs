//! Scripted call capability for routing and failover tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use super::traits::ModelCaller;
use super::types::{CallError, ProviderId};

/// One observed call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub provider: ProviderId,
    pub model_id: String,
    pub prompt: String,
}

/// Replies per model id, consumed in order. Unscripted models time out.
#[derive(Default)]
pub struct ScriptedCaller {
    replies: Mutex<HashMap<String, VecDeque<Result<String, CallError>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedCaller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, model_id: &str, text: &str) -> Self {
        self.push(model_id, Ok(text.to_string()))
    }

    pub fn fail(self, model_id: &str, error: CallError) -> Self {
        self.push(model_id, Err(error))
    }

    fn push(self, model_id: &str, outcome: Result<String, CallError>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(model_id.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, model_id: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.model_id == model_id)
            .count()
    }
}

#[async_trait]
impl ModelCaller for ScriptedCaller {
    async fn generate(
        &self,
        provider: ProviderId,
        _api_key: &str,
        model_id: &str,
        prompt: &str,
        timeout: Duration,
    ) -> Result<String, CallError> {
        self.calls.lock().unwrap().push(RecordedCall {
            provider,
            model_id: model_id.to_string(),
            prompt: prompt.to_string(),
        });

        self.replies
            .lock()
            .unwrap()
            .get_mut(model_id)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(Err(CallError::Timeout(timeout)))
    }
}
