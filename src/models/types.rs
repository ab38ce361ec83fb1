use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// An external language-model vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Google,
    Groq,
}

impl ProviderId {
    /// Every supported provider, in key-slot order
    pub const ALL: [ProviderId; 2] = [ProviderId::Google, ProviderId::Groq];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Google => "google",
            ProviderId::Groq => "groq",
        }
    }

    /// Human-facing label used in prompts
    pub fn label(&self) -> &'static str {
        match self {
            ProviderId::Google => "Google AI",
            ProviderId::Groq => "Groq",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a model is good at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityClass {
    Reasoning,
    ToolUse,
    Vision,
    General,
    Speed,
}

impl fmt::Display for CapabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CapabilityClass::Reasoning => "reasoning",
            CapabilityClass::ToolUse => "tool_use",
            CapabilityClass::Vision => "vision",
            CapabilityClass::General => "general",
            CapabilityClass::Speed => "speed",
        };
        f.write_str(s)
    }
}

/// A catalog entry identifying one selectable backend model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub provider: ProviderId,
    pub model_id: String,
    pub display_name: String,
    pub description: String,
    pub capability: CapabilityClass,
}

impl ModelDescriptor {
    pub fn new(
        provider: ProviderId,
        model_id: &str,
        display_name: &str,
        description: &str,
        capability: CapabilityClass,
    ) -> Self {
        Self {
            provider,
            model_id: model_id.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            capability,
        }
    }
}

/// A low-latency model used to classify prompts in automatic mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterModel {
    pub provider: ProviderId,
    pub model_id: String,
}

impl RouterModel {
    pub fn new(provider: ProviderId, model_id: &str) -> Self {
        Self {
            provider,
            model_id: model_id.to_string(),
        }
    }
}

/// Failure of a single provider call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: ProviderId,
        status: u16,
        body: String,
    },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("no API key configured for {0}")]
    MissingKey(ProviderId),
}
