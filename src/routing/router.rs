use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::models::{ModelCaller, ModelDescriptor, ModelRegistry};
use crate::session::{RoutingMode, Session};

/// Chooses the target model for a prompt
pub struct Router {
    registry: Arc<ModelRegistry>,
    classifier_timeout: Duration,
}

impl Router {
    pub fn new(registry: Arc<ModelRegistry>, classifier_timeout: Duration) -> Self {
        Self {
            registry,
            classifier_timeout,
        }
    }

    /// Pick the model for `prompt`
    ///
    /// Manual mode returns the pinned model without any classifier call.
    /// Automatic mode asks each router model in order and falls back to the
    /// registry default when none of them yields a known model id.
    pub async fn select_target(
        &self,
        session: &Session,
        prompt: &str,
        caller: &dyn ModelCaller,
    ) -> ModelDescriptor {
        if let RoutingMode::Manual(pinned) = session.mode() {
            return pinned.clone();
        }

        let instruction = self.classification_instruction(prompt);

        for router in self.registry.router_pool() {
            let reply = caller
                .generate(
                    router.provider,
                    session.api_key(router.provider),
                    &router.model_id,
                    &instruction,
                    self.classifier_timeout,
                )
                .await;

            match reply {
                Ok(reply) => match parse_classification(&reply, &self.registry) {
                    Some(choice) => {
                        debug!("Router {} picked {}", router.model_id, choice.model_id);
                        return choice.clone();
                    }
                    None => debug!("Router {} gave no known model id", router.model_id),
                },
                Err(e) => debug!("Router {} failed: {}", router.model_id, e),
            }
        }

        let fallback = self.registry.default_model();
        debug!("Classification unavailable, using default {}", fallback.model_id);
        fallback.clone()
    }

    /// Build the instruction sent to a router model
    pub fn classification_instruction(&self, prompt: &str) -> String {
        let catalog: Vec<Value> = self
            .registry
            .all()
            .iter()
            .map(|m| {
                let mut entry = Map::new();
                entry.insert(m.model_id.clone(), Value::String(m.description.clone()));
                Value::Object(entry)
            })
            .collect();

        format!(
            "Choose the best model ID for this request: '{}'. Models: {}. \
             Return ONLY the model ID, with no quotes, punctuation or explanation.",
            prompt,
            Value::Array(catalog)
        )
    }
}

/// Resolve a classifier reply to a registry entry
///
/// Whitespace and quote characters are stripped, then the first registry
/// entry whose id occurs anywhere in the reply wins.
pub fn parse_classification<'r>(
    reply: &str,
    registry: &'r ModelRegistry,
) -> Option<&'r ModelDescriptor> {
    let cleaned: String = reply
        .trim()
        .chars()
        .filter(|c| *c != '"' && *c != '\'')
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return None;
    }

    registry
        .all()
        .iter()
        .find(|m| cleaned.contains(m.model_id.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testing::ScriptedCaller;
    use crate::models::{CallError, MockModelCaller, ProviderId};
    use crate::vault::{Credentials, Record};
    use pretty_assertions::assert_eq;

    fn session() -> Session {
        Session::new(Record::new(Credentials::new("abc123", "g-key", "q-key")))
    }

    fn router() -> (Router, Arc<ModelRegistry>) {
        let registry = Arc::new(ModelRegistry::default());
        (
            Router::new(registry.clone(), Duration::from_secs(1)),
            registry,
        )
    }

    #[test]
    fn test_parse_strips_whitespace_and_quotes() {
        let registry = ModelRegistry::default();

        let found = parse_classification("  'gemini-2.5-flash' ", &registry).unwrap();
        assert_eq!(found.model_id, "gemini-2.5-flash");

        let found = parse_classification("\"groq/compound\"\n", &registry).unwrap();
        assert_eq!(found.model_id, "groq/compound");
    }

    #[test]
    fn test_parse_tolerates_surrounding_noise() {
        let registry = ModelRegistry::default();

        let found =
            parse_classification("The best fit is llama-3.3-70b-versatile.", &registry).unwrap();
        assert_eq!(found.display_name, "Llama 3.3 70B");
    }

    #[test]
    fn test_parse_first_registry_entry_wins() {
        let registry = ModelRegistry::default();

        // Both ids occur; registry order decides
        let found =
            parse_classification("gemini-2.5-flash or gemini-3-pro-preview", &registry).unwrap();
        assert_eq!(found.model_id, "gemini-3-pro-preview");
    }

    #[test]
    fn test_parse_unknown_reply() {
        let registry = ModelRegistry::default();

        assert!(parse_classification("gpt-5", &registry).is_none());
        assert!(parse_classification("  '' ", &registry).is_none());
    }

    #[test]
    fn test_instruction_embeds_prompt_and_catalog() {
        let (router, registry) = router();
        let instruction = router.classification_instruction("describe this photo");

        assert!(instruction.contains("'describe this photo'"));
        for model in registry.all() {
            assert!(instruction.contains(&model.model_id));
            assert!(instruction.contains(&model.description));
        }
        assert!(instruction.contains("Return ONLY the model ID"));
    }

    #[tokio::test]
    async fn test_manual_mode_makes_no_classifier_calls() {
        let (router, registry) = router();
        let pinned = registry
            .find_by_id("meta-llama/llama-4-scout-17b-16e-instruct")
            .unwrap()
            .clone();
        let mut session = session();
        session.pin(pinned.clone());

        let mut caller = MockModelCaller::new();
        caller.expect_generate().times(0);

        for prompt in ["", "solve x^2 = 4", "what's in this image?"] {
            let chosen = router.select_target(&session, prompt, &caller).await;
            assert_eq!(chosen, pinned);
        }
    }

    #[tokio::test]
    async fn test_first_router_answer_is_used() {
        let (router, _) = router();
        let mut caller = MockModelCaller::new();
        caller
            .expect_generate()
            .times(1)
            .withf(|provider, key, model, _, _| {
                *provider == ProviderId::Groq
                    && key.to_string() == "q-key"
                    && model.to_string() == "llama-3.3-70b-versatile"
            })
            .returning(|_, _, _, _, _| Ok("openai/gpt-oss-120b".to_string()));

        let chosen = router.select_target(&session(), "prove it", &caller).await;
        assert_eq!(chosen.model_id, "openai/gpt-oss-120b");
    }

    #[tokio::test]
    async fn test_second_router_used_when_first_fails() {
        let (router, _) = router();
        let caller = ScriptedCaller::new()
            .fail("llama-3.3-70b-versatile", CallError::Transport("connection reset".to_string()))
            .reply("gemini-2.5-flash", "gemini-2.5-pro");

        let chosen = router.select_target(&session(), "write a poem", &caller).await;

        assert_eq!(chosen.model_id, "gemini-2.5-pro");
        assert_eq!(caller.calls().len(), 2);
        assert_eq!(caller.calls()[1].provider, ProviderId::Google);
    }

    #[tokio::test]
    async fn test_all_routers_time_out_gives_default() {
        let (router, registry) = router();
        assert_eq!(registry.len(), 8);

        // Unscripted calls time out
        let caller = ScriptedCaller::new();

        let chosen = router.select_target(&session(), "anything", &caller).await;

        assert_eq!(&chosen, &registry.all()[0]);
        assert_eq!(caller.calls().len(), registry.router_pool().len());
    }

    #[tokio::test]
    async fn test_unparseable_replies_give_default() {
        let (router, registry) = router();
        let caller = ScriptedCaller::new()
            .reply("llama-3.3-70b-versatile", "I cannot decide")
            .reply("gemini-2.5-flash", "");

        let chosen = router.select_target(&session(), "anything", &caller).await;
        assert_eq!(&chosen, registry.default_model());
    }
}
