//! Google Gemini provider implementation
//!
//! Calls the `generateContent` endpoint with the prompt as a single user part
//! and joins the text parts of the first candidate.

use crate::config::{ProviderConfig, SecretString};
use crate::http::{HttpClient, RequestOptions};
use crate::protocol::Prompt;
use crate::providers::adapter::{require_credential, Provider};
use crate::providers::error::{ConfigurationError, GenerationError, GenerationResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Gemini provider
pub struct GeminiProvider {
    name: String,
    api_key: SecretString,
    base_url: String,
    model: String,
    request_timeout: Duration,
    http: HttpClient,
}

impl GeminiProvider {
    /// Create a provider with explicit settings
    pub fn new(
        name: impl Into<String>,
        api_key: SecretString,
        base_url: impl Into<String>,
        model: impl Into<String>,
        http: HttpClient,
    ) -> Self {
        Self {
            name: name.into(),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            request_timeout: Duration::from_secs(30),
            http,
        }
    }

    /// Create a provider from configuration; fails if the credential is absent
    pub fn from_config(
        config: &ProviderConfig,
        http: HttpClient,
    ) -> Result<Self, ConfigurationError> {
        let api_key = require_credential(config)?;
        let mut provider = Self::new(
            config.name.clone(),
            api_key,
            config.effective_base_url(),
            config.effective_model(),
            http,
        );
        if let Some(timeout_ms) = config.timeout_ms {
            provider.request_timeout = Duration::from_millis(timeout_ms);
        }
        Ok(provider)
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_text(&self, prompt: &Prompt, request_id: Uuid) -> GenerationResult<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: prompt.as_str(),
                }],
            }],
        };
        // Header auth keeps the key out of the URL and therefore out of logs
        let headers = [("x-goog-api-key", self.api_key.expose_secret().to_string())];
        let options = RequestOptions::new()
            .with_request_id(request_id)
            .with_timeout(self.request_timeout);

        let response: GenerateContentResponse = self
            .http
            .post_json(&self.name, &url, &headers, &request, &options)
            .await?;

        let Some(candidate) = response.candidates.into_iter().next() else {
            return match response.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => Err(GenerationError::Other(format!(
                    "Prompt blocked by Gemini: {}",
                    reason
                ))),
                None => Err(GenerationError::MalformedResponse(
                    "response contained no candidates".to_string(),
                )),
            };
        };

        Ok(candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default())
    }
}
