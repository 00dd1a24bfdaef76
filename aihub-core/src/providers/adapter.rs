//! Provider adapter trait and provider types
//!
//! Defines the uniform contract every text-generation backend is wrapped in,
//! and the factory that turns a [`ProviderConfig`] into a ready adapter.

use crate::config::{ProviderConfig, SecretString};
use crate::http::HttpClient;
use crate::protocol::Prompt;
use crate::providers::error::{ConfigurationError, GenerationResult};
use crate::providers::gemini::GeminiProvider;
use crate::providers::mock::MockProvider;
use crate::providers::openai::OpenAICompatibleProvider;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Core provider trait that all generation backends implement.
///
/// An adapter makes exactly one upstream attempt per call and never panics on
/// upstream failure; every failure path is a [`GenerationError`](crate::providers::GenerationError).
#[async_trait]
pub trait Provider: Send + Sync {
    /// Unique name within a fallback chain, used as the diagnostics key
    fn name(&self) -> &str;

    /// Generate text for the prompt.
    ///
    /// `request_id` identifies the routed request; HTTP adapters forward it
    /// as `X-Request-ID`.
    async fn generate_text(&self, prompt: &Prompt, request_id: Uuid) -> GenerationResult<String>;
}

/// Supported provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    DeepSeek,
    Gemini,
    OpenAI,
    Groq,
    /// Offline keyword-matched answers, no credential needed
    Mock,
}

impl ProviderType {
    pub const ALL: [ProviderType; 5] = [
        ProviderType::DeepSeek,
        ProviderType::Gemini,
        ProviderType::OpenAI,
        ProviderType::Groq,
        ProviderType::Mock,
    ];

    /// Identifier used in configuration files and `AI_PROVIDER_ORDER`
    pub fn id(&self) -> &'static str {
        match self {
            ProviderType::DeepSeek => "deepseek",
            ProviderType::Gemini => "gemini",
            ProviderType::OpenAI => "openai",
            ProviderType::Groq => "groq",
            ProviderType::Mock => "mock",
        }
    }

    /// Display name used when the configuration does not set one
    pub fn default_name(&self) -> &'static str {
        match self {
            ProviderType::DeepSeek => "DeepSeek",
            ProviderType::Gemini => "Gemini",
            ProviderType::OpenAI => "OpenAI",
            ProviderType::Groq => "Groq",
            ProviderType::Mock => MockProvider::NAME,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderType::DeepSeek => "deepseek-chat",
            ProviderType::Gemini => "gemini-1.5-flash",
            ProviderType::OpenAI => "gpt-3.5-turbo",
            ProviderType::Groq => "llama3-70b-8192",
            ProviderType::Mock => "keyword-match",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderType::DeepSeek => "https://api.deepseek.com/v1",
            ProviderType::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            ProviderType::OpenAI => "https://api.openai.com/v1",
            ProviderType::Groq => "https://api.groq.com/openai/v1",
            ProviderType::Mock => "",
        }
    }

    /// Environment variable that conventionally holds the credential
    pub fn credential_env_var(&self) -> Option<&'static str> {
        match self {
            ProviderType::DeepSeek => Some("DEEPSEEK_API_KEY"),
            ProviderType::Gemini => Some("GEMINI_API_KEY"),
            ProviderType::OpenAI => Some("OPENAI_API_KEY"),
            ProviderType::Groq => Some("GROQ_API_KEY"),
            ProviderType::Mock => None,
        }
    }

    /// Create a provider instance for this type.
    ///
    /// Fails with [`ConfigurationError::MissingCredential`] when the type needs
    /// a credential and the configuration has none.
    pub fn create_provider(
        &self,
        config: &ProviderConfig,
        http: &HttpClient,
    ) -> Result<Box<dyn Provider>, ConfigurationError> {
        match self {
            ProviderType::DeepSeek | ProviderType::OpenAI | ProviderType::Groq => Ok(Box::new(
                OpenAICompatibleProvider::from_config(config, http.clone())?,
            )),
            ProviderType::Gemini => Ok(Box::new(GeminiProvider::from_config(
                config,
                http.clone(),
            )?)),
            ProviderType::Mock => Ok(Box::new(MockProvider::with_name(config.name.clone()))),
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProviderType {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.id() == wanted)
            .ok_or_else(|| ConfigurationError::UnknownProviderType(s.trim().to_string()))
    }
}

/// Credential from the configuration, or the construction-time error
pub(crate) fn require_credential(
    config: &ProviderConfig,
) -> Result<SecretString, ConfigurationError> {
    config
        .credential()
        .cloned()
        .ok_or_else(|| ConfigurationError::MissingCredential {
            provider: config.name.clone(),
            env_var: config
                .provider_type
                .credential_env_var()
                .unwrap_or("api_key")
                .to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_round_trips_through_str() {
        for provider_type in ProviderType::ALL {
            assert_eq!(provider_type.id().parse::<ProviderType>(), Ok(provider_type));
        }
        assert_eq!(" Gemini ".parse::<ProviderType>(), Ok(ProviderType::Gemini));
    }

    #[test]
    fn test_unknown_provider_type_is_configuration_error() {
        let err = " claude ".parse::<ProviderType>().unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownProviderType("claude".to_string()));
        assert_eq!(err.to_string(), "unknown provider type 'claude'");
    }

    #[test]
    fn test_missing_credential_fails_construction() {
        let http = HttpClient::new().unwrap();
        let config = ProviderConfig::new(ProviderType::DeepSeek);

        let err = ProviderType::DeepSeek
            .create_provider(&config, &http)
            .err()
            .unwrap();
        assert_eq!(
            err,
            ConfigurationError::MissingCredential {
                provider: "DeepSeek".to_string(),
                env_var: "DEEPSEEK_API_KEY".to_string(),
            }
        );
    }

    #[test]
    fn test_blank_credential_counts_as_missing() {
        let http = HttpClient::new().unwrap();
        let config = ProviderConfig::new(ProviderType::Gemini).with_api_key("   ");

        assert!(matches!(
            ProviderType::Gemini.create_provider(&config, &http),
            Err(ConfigurationError::MissingCredential { .. })
        ));
    }

    #[test]
    fn test_mock_needs_no_credential() {
        let http = HttpClient::new().unwrap();
        let config = ProviderConfig::new(ProviderType::Mock);

        let provider = ProviderType::Mock.create_provider(&config, &http).unwrap();
        assert_eq!(provider.name(), MockProvider::NAME);
    }

    #[test]
    fn test_configured_name_is_used() {
        let http = HttpClient::new().unwrap();
        let mut config = ProviderConfig::new(ProviderType::Groq).with_api_key("gsk_test_key");
        config.name = "groq-fast".to_string();

        let provider = ProviderType::Groq.create_provider(&config, &http).unwrap();
        assert_eq!(provider.name(), "groq-fast");
    }
}
