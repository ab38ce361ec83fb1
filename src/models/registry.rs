use serde::{Deserialize, Serialize};

use super::types::{CapabilityClass, ModelDescriptor, ProviderId, RouterModel};
use crate::utils::NeurolinkError;

/// Immutable catalog configuration injected into the registry and router
///
/// Order of `models` is priority order: the first entry is the automatic
/// default and the last entry is the failover target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub models: Vec<ModelDescriptor>,
    pub router_pool: Vec<RouterModel>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        use CapabilityClass::*;
        use ProviderId::*;

        Self {
            models: vec![
                ModelDescriptor::new(
                    Google,
                    "gemini-3-pro-preview",
                    "Gemini 3 Pro",
                    "Logic Master: Deep reasoning, code, math.",
                    Reasoning,
                ),
                ModelDescriptor::new(
                    Groq,
                    "openai/gpt-oss-120b",
                    "GPT-OSS 120B",
                    "Open Source Giant: Intricate instructions.",
                    Reasoning,
                ),
                ModelDescriptor::new(
                    Groq,
                    "groq/compound",
                    "Groq Compound Agent",
                    "Agentic: Search, tools, and real-time data.",
                    ToolUse,
                ),
                ModelDescriptor::new(
                    Groq,
                    "meta-llama/llama-4-maverick-17b-128e-instruct",
                    "Llama 4 Maverick",
                    "High-end Multimodal Vision.",
                    Vision,
                ),
                ModelDescriptor::new(
                    Groq,
                    "meta-llama/llama-4-scout-17b-16e-instruct",
                    "Llama 4 Scout",
                    "Fast Multimodal Vision.",
                    Vision,
                ),
                ModelDescriptor::new(
                    Google,
                    "gemini-2.5-pro",
                    "Gemini 2.5 Pro",
                    "Stable workhorse: Writing and creative tasks.",
                    General,
                ),
                ModelDescriptor::new(
                    Groq,
                    "llama-3.3-70b-versatile",
                    "Llama 3.3 70B",
                    "Versatile conversationalist.",
                    General,
                ),
                ModelDescriptor::new(
                    Google,
                    "gemini-2.5-flash",
                    "Gemini 2.5 Flash",
                    "Speed Demon: High throughput backup.",
                    Speed,
                ),
            ],
            router_pool: vec![
                RouterModel::new(Groq, "llama-3.3-70b-versatile"),
                RouterModel::new(Google, "gemini-2.5-flash"),
            ],
        }
    }
}

/// Ordered, read-only catalog of selectable models
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
    router_pool: Vec<RouterModel>,
}

impl ModelRegistry {
    /// Build a registry from configuration, rejecting an empty catalog
    pub fn new(config: RegistryConfig) -> Result<Self, NeurolinkError> {
        if config.models.is_empty() {
            return Err(NeurolinkError::RegistryError(
                "model catalog must contain at least one model".to_string(),
            ));
        }
        if let Some(blank) = config.models.iter().find(|m| m.model_id.trim().is_empty()) {
            return Err(NeurolinkError::RegistryError(format!(
                "model '{}' has an empty model id",
                blank.display_name
            )));
        }

        Ok(Self {
            models: config.models,
            router_pool: config.router_pool,
        })
    }

    pub fn all(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn find_by_id(&self, model_id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.model_id == model_id)
    }

    /// Entry by menu position
    pub fn get(&self, index: usize) -> Option<&ModelDescriptor> {
        self.models.get(index)
    }

    /// The automatic default (first entry)
    pub fn default_model(&self) -> &ModelDescriptor {
        &self.models[0]
    }

    /// The last-resort model (last entry)
    pub fn failover_target(&self) -> &ModelDescriptor {
        &self.models[self.models.len() - 1]
    }

    pub fn router_pool(&self) -> &[RouterModel] {
        &self.router_pool
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        let config = RegistryConfig::default();
        Self {
            models: config.models,
            router_pool: config.router_pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_order() {
        let registry = ModelRegistry::default();

        assert_eq!(registry.len(), 8);
        assert_eq!(registry.default_model().model_id, "gemini-3-pro-preview");
        assert_eq!(registry.failover_target().model_id, "gemini-2.5-flash");
        assert_eq!(registry.router_pool().len(), 2);
        assert_eq!(registry.router_pool()[0].provider, ProviderId::Groq);
    }

    #[test]
    fn test_find_by_id() {
        let registry = ModelRegistry::default();

        let found = registry.find_by_id("groq/compound").unwrap();
        assert_eq!(found.display_name, "Groq Compound Agent");
        assert_eq!(found.capability, CapabilityClass::ToolUse);

        assert!(registry.find_by_id("gpt-5").is_none());
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let config = RegistryConfig {
            models: vec![],
            router_pool: vec![],
        };

        assert!(matches!(
            ModelRegistry::new(config),
            Err(NeurolinkError::RegistryError(_))
        ));
    }

    #[test]
    fn test_single_entry_is_default_and_failover() {
        let only = ModelDescriptor::new(
            ProviderId::Groq,
            "llama-3.3-70b-versatile",
            "Llama 3.3 70B",
            "Versatile conversationalist.",
            CapabilityClass::General,
        );
        let registry = ModelRegistry::new(RegistryConfig {
            models: vec![only.clone()],
            router_pool: vec![],
        })
        .unwrap();

        assert_eq!(registry.default_model(), &only);
        assert_eq!(registry.failover_target(), &only);
    }
}
