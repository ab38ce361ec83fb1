use serde::Serialize;

use crate::cli::OutputFormat;
use crate::routing::{ExecutionEngine, ExecutionError, ExecutionOutcome};
use crate::session::Session;

/// Result of a one-shot prompt, shaped for output
#[derive(Debug, Serialize)]
pub struct NonInteractiveResult {
    pub prompt: String,
    pub model: Option<String>,
    pub model_id: Option<String>,
    pub provider: Option<String>,
    pub response: Option<String>,
    pub failed_over: bool,
    pub errors: Vec<String>,
}

impl NonInteractiveResult {
    fn from_outcome(prompt: &str, result: Result<ExecutionOutcome, ExecutionError>) -> Self {
        match result {
            Ok(outcome) => {
                let mut errors = Vec::new();
                if let Some(e) = outcome.persist_error {
                    errors.push(format!("history not saved: {}", e));
                }
                Self {
                    prompt: prompt.to_string(),
                    model: Some(outcome.model.display_name),
                    model_id: Some(outcome.model.model_id),
                    provider: Some(outcome.model.provider.to_string()),
                    response: Some(outcome.response),
                    failed_over: outcome.failed_over,
                    errors,
                }
            }
            Err(e) => Self {
                prompt: prompt.to_string(),
                model: None,
                model_id: None,
                provider: None,
                response: None,
                failed_over: true,
                errors: vec![e.to_string()],
            },
        }
    }

    /// True when no response was produced
    pub fn failed(&self) -> bool {
        self.response.is_none()
    }
}

/// Runs a single prompt without the interactive loop
pub struct NonInteractiveRunner<'a> {
    engine: &'a ExecutionEngine,
}

impl<'a> NonInteractiveRunner<'a> {
    pub fn new(engine: &'a ExecutionEngine) -> Self {
        Self { engine }
    }

    pub async fn execute(&self, session: &mut Session, prompt: &str) -> NonInteractiveResult {
        let result = self.engine.execute(session, prompt).await;
        NonInteractiveResult::from_outcome(prompt, result)
    }

    /// Format the result based on the output format
    pub fn format_result(&self, result: &NonInteractiveResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_else(|e| {
                format!("{{\"errors\": [\"failed to serialize result: {}\"]}}", e)
            }),
            OutputFormat::Text => {
                let mut out = String::new();
                if let Some(response) = &result.response {
                    out.push_str(response);
                }
                for error in &result.errors {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str("Error: ");
                    out.push_str(error);
                }
                out
            }
        }
    }
}
