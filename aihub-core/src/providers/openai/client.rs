//! OpenAI-compatible chat completions adapter

use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::{ProviderConfig, SecretString};
use crate::http::{HttpClient, RequestOptions};
use crate::protocol::Prompt;
use crate::providers::adapter::{require_credential, Provider, ProviderType};
use crate::providers::error::{ConfigurationError, GenerationError, GenerationResult};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Sampling parameters sent with every request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl SamplingOptions {
    /// Defaults per provider type
    pub fn for_type(provider_type: ProviderType) -> Self {
        match provider_type {
            ProviderType::OpenAI => Self {
                temperature: None,
                max_tokens: Some(500),
            },
            _ => Self {
                temperature: Some(0.7),
                max_tokens: None,
            },
        }
    }
}

/// Adapter for any backend exposing `POST {base_url}/chat/completions`
pub struct OpenAICompatibleProvider {
    name: String,
    api_key: SecretString,
    base_url: String,
    model: String,
    sampling: SamplingOptions,
    request_timeout: Duration,
    http: HttpClient,
}

impl OpenAICompatibleProvider {
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
            sampling: SamplingOptions {
                temperature: Some(0.7),
                max_tokens: None,
            },
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
        )
        .with_sampling(SamplingOptions::for_type(config.provider_type));

        if let Some(timeout_ms) = config.timeout_ms {
            provider.request_timeout = Duration::from_millis(timeout_ms);
        }

        Ok(provider)
    }

    /// Override sampling parameters
    pub fn with_sampling(mut self, sampling: SamplingOptions) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Provider for OpenAICompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_text(&self, prompt: &Prompt, request_id: Uuid) -> GenerationResult<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.as_str(),
            }],
            temperature: self.sampling.temperature,
            max_tokens: self.sampling.max_tokens,
        };
        let headers = [(
            "Authorization",
            format!("Bearer {}", self.api_key.expose_secret()),
        )];
        let options = RequestOptions::new()
            .with_request_id(request_id)
            .with_timeout(self.request_timeout);

        let response: ChatCompletionResponse = self
            .http
            .post_json(&self.name, &url, &headers, &request, &options)
            .await?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            GenerationError::MalformedResponse("response contained no choices".to_string())
        })?;

        debug!(
            "{} finished with reason {}",
            self.name,
            choice.finish_reason.as_deref().unwrap_or("unknown")
        );

        // A null content is passed through as empty text; the router treats it as a failure
        Ok(choice.message.content.unwrap_or_default())
    }
}
