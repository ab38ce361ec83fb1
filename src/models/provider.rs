use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use std::time::Duration;

use super::traits::{ModelCaller, ModelLister};
use super::types::{CallError, ProviderId};
use crate::constants::{GOOGLE_BASE_URL, GROQ_BASE_URL};

/// HTTP client for the two supported providers
///
/// Google takes a single-turn `generateContent` request; Groq takes an
/// OpenAI-style chat completion with one user message.
pub struct ProviderClient {
    client: Client,
    google_base_url: String,
    groq_base_url: String,
}

impl ProviderClient {
    pub fn new(google_base_url: &str, groq_base_url: &str) -> Self {
        Self {
            client: Client::new(),
            google_base_url: google_base_url.trim_end_matches('/').to_string(),
            groq_base_url: groq_base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn send(
        &self,
        provider: ProviderId,
        request: RequestBuilder,
        timeout: Duration,
    ) -> Result<Response, CallError> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_transport(e, timeout))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CallError::Status {
                provider,
                status,
                body,
            });
        }

        Ok(response)
    }

    async fn generate_google(
        &self,
        api_key: &str,
        model_id: &str,
        prompt: &str,
        timeout: Duration,
    ) -> Result<String, CallError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.google_base_url, model_id
        );
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        let request = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body);

        let response = self.send(ProviderId::Google, request, timeout).await?;
        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| CallError::MalformedResponse(e.to_string()))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| CallError::MalformedResponse("no candidate text in reply".to_string()))
    }

    async fn generate_groq(
        &self,
        api_key: &str,
        model_id: &str,
        prompt: &str,
        timeout: Duration,
    ) -> Result<String, CallError> {
        let url = format!("{}/openai/v1/chat/completions", self.groq_base_url);
        let body = json!({
            "model": model_id,
            "messages": [{ "role": "user", "content": prompt }],
        });
        let request = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body);

        let response = self.send(ProviderId::Groq, request, timeout).await?;
        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CallError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CallError::MalformedResponse("no choice content in reply".to_string()))
    }
}

impl Default for ProviderClient {
    fn default() -> Self {
        Self::new(GOOGLE_BASE_URL, GROQ_BASE_URL)
    }
}

#[async_trait]
impl ModelCaller for ProviderClient {
    async fn generate(
        &self,
        provider: ProviderId,
        api_key: &str,
        model_id: &str,
        prompt: &str,
        timeout: Duration,
    ) -> Result<String, CallError> {
        if api_key.trim().is_empty() {
            return Err(CallError::MissingKey(provider));
        }

        match provider {
            ProviderId::Google => self.generate_google(api_key, model_id, prompt, timeout).await,
            ProviderId::Groq => self.generate_groq(api_key, model_id, prompt, timeout).await,
        }
    }
}

#[async_trait]
impl ModelLister for ProviderClient {
    async fn list_models(
        &self,
        provider: ProviderId,
        api_key: &str,
        timeout: Duration,
    ) -> Result<HashSet<String>, CallError> {
        if api_key.trim().is_empty() {
            return Err(CallError::MissingKey(provider));
        }

        match provider {
            ProviderId::Google => {
                let url = format!("{}/v1beta/models", self.google_base_url);
                let request = self.client.get(&url).query(&[("key", api_key)]);
                let response = self.send(provider, request, timeout).await?;
                let parsed: GoogleModelList = response
                    .json()
                    .await
                    .map_err(|e| CallError::MalformedResponse(e.to_string()))?;

                Ok(parsed
                    .models
                    .into_iter()
                    .map(|m| strip_models_prefix(&m.name).to_string())
                    .collect())
            }
            ProviderId::Groq => {
                let url = format!("{}/openai/v1/models", self.groq_base_url);
                let request = self
                    .client
                    .get(&url)
                    .header("Authorization", format!("Bearer {}", api_key));
                let response = self.send(provider, request, timeout).await?;
                let parsed: OpenAiModelList = response
                    .json()
                    .await
                    .map_err(|e| CallError::MalformedResponse(e.to_string()))?;

                Ok(parsed.data.into_iter().map(|m| m.id).collect())
            }
        }
    }
}

fn map_transport(err: reqwest::Error, timeout: Duration) -> CallError {
    if err.is_timeout() {
        CallError::Timeout(timeout)
    } else {
        CallError::Transport(err.without_url().to_string())
    }
}

/// Google lists models as `models/<id>`
fn strip_models_prefix(name: &str) -> &str {
    name.strip_prefix("models/").unwrap_or(name)
}

// Google generateContent response

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

// Groq chat completion response (OpenAI format)

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

// Model listings

#[derive(Debug, Deserialize)]
struct GoogleModelList {
    #[serde(default)]
    models: Vec<GoogleModelInfo>,
}

#[derive(Debug, Deserialize)]
struct GoogleModelInfo {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiModelList {
    #[serde(default)]
    data: Vec<OpenAiModelInfo>,
}

#[derive(Debug, Deserialize)]
struct OpenAiModelInfo {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_models_prefix() {
        assert_eq!(strip_models_prefix("models/gemini-2.5-pro"), "gemini-2.5-pro");
        assert_eq!(strip_models_prefix("gemini-2.5-pro"), "gemini-2.5-pro");
    }

    #[test]
    fn test_google_reply_shape() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"hello"}],"role":"model"}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let text = parsed.candidates[0].content.as_ref().unwrap().parts[0].text.clone();
        assert_eq!(text.as_deref(), Some("hello"));

        // Blocked prompts come back without candidates
        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(blocked.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_blank_key_short_circuits() {
        // Unroutable base URL: a network attempt would fail differently
        let client = ProviderClient::new("http://127.0.0.1:9", "http://127.0.0.1:9");

        let err = client
            .generate(
                ProviderId::Groq,
                "  ",
                "llama-3.3-70b-versatile",
                "hi",
                Duration::from_secs(1),
            )
            .await
            .unwrap_err();
        assert_eq!(err, CallError::MissingKey(ProviderId::Groq));

        let err = client
            .list_models(ProviderId::Google, "", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err, CallError::MissingKey(ProviderId::Google));
    }
}
