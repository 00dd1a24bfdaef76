//! Configuration schema structures with serde support

use super::error::{ValidationError, ValidationErrorKind};
use super::secrets::SecretString;
use crate::providers::ProviderType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Supported configuration schema version
pub const CONFIG_VERSION: &str = "0.1";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HubConfig {
    /// Schema version (required - no default)
    pub version: String,

    /// Configured generation providers
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,

    /// Fallback routing configuration
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Outbound HTTP connection settings
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Generation provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Unique provider name, used as the diagnostics key
    pub name: String,

    /// Provider type (deepseek, gemini, openai, groq, mock)
    #[serde(rename = "type")]
    pub provider_type: ProviderType,

    /// API key (supports environment variable interpolation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,

    /// Override for the provider's API base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Override for the model identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Per-attempt timeout; falls back to `routing.default_timeout_ms`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Whether this provider takes part in routing
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ProviderConfig {
    /// Minimal configuration for a provider type with its default name
    pub fn new(provider_type: ProviderType) -> Self {
        Self {
            name: provider_type.default_name().to_string(),
            provider_type,
            api_key: None,
            base_url: None,
            model: None,
            timeout_ms: None,
            enabled: true,
        }
    }

    /// Set the credential
    pub fn with_api_key(mut self, api_key: impl Into<SecretString>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Credential, if present and not blank
    pub fn credential(&self) -> Option<&SecretString> {
        self.api_key.as_ref().filter(|k| !k.is_blank())
    }

    /// Base URL, falling back to the provider type default
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider_type.default_base_url())
    }

    /// Model, falling back to the provider type default
    pub fn effective_model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider_type.default_model())
    }
}

/// What to do when a provider's credential is absent at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingCredentialPolicy {
    /// Leave the provider out of the chain and keep going
    #[default]
    Exclude,
    /// Refuse to start
    Abort,
}

impl std::str::FromStr for MissingCredentialPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exclude" => Ok(Self::Exclude),
            "abort" => Ok(Self::Abort),
            other => Err(format!("expected 'exclude' or 'abort', got '{}'", other)),
        }
    }
}

/// Routing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Provider names in fallback order. Empty means declaration order.
    #[serde(default)]
    pub order: Vec<String>,

    /// Per-attempt timeout in milliseconds when a provider sets none
    #[serde(default = "default_attempt_timeout")]
    pub default_timeout_ms: u64,

    /// Policy for providers whose credential is missing
    #[serde(default)]
    pub missing_credential: MissingCredentialPolicy,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            default_timeout_ms: default_attempt_timeout(),
            missing_credential: MissingCredentialPolicy::default(),
        }
    }
}

/// Connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Request timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Maximum idle connections per host
    #[serde(default = "default_max_idle")]
    pub max_idle_per_host: usize,

    /// Keep-alive timeout in seconds
    #[serde(default = "default_keepalive")]
    pub keepalive_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout(),
            request_timeout_ms: default_request_timeout(),
            max_idle_per_host: default_max_idle(),
            keepalive_secs: default_keepalive(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// Default value functions for serde
fn default_true() -> bool { true }
fn default_attempt_timeout() -> u64 { 10_000 }
fn default_connect_timeout() -> u64 { 10_000 }
fn default_request_timeout() -> u64 { 60_000 }
fn default_max_idle() -> usize { 10 }
fn default_keepalive() -> u64 { 90 }
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 4000 }

impl HubConfig {
    /// Empty configuration at the current schema version
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            providers: Vec::new(),
            routing: RoutingConfig::default(),
            connection: ConnectionConfig::default(),
            server: ServerConfig::default(),
        }
    }

    /// Look up a provider by name
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name == name)
    }

    /// Enabled providers in fallback order
    pub fn ordered_providers(&self) -> Vec<&ProviderConfig> {
        if self.routing.order.is_empty() {
            self.providers.iter().filter(|p| p.enabled).collect()
        } else {
            self.routing
                .order
                .iter()
                .filter_map(|name| self.provider(name))
                .filter(|p| p.enabled)
                .collect()
        }
    }

    /// Timeout for one attempt against the given provider
    pub fn attempt_timeout(&self, provider: &ProviderConfig) -> Duration {
        Duration::from_millis(
            provider
                .timeout_ms
                .unwrap_or(self.routing.default_timeout_ms),
        )
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.version.is_empty() {
            return Err(ValidationError::missing("version"));
        }

        if self.version != CONFIG_VERSION {
            return Err(ValidationError::new(
                "version",
                ValidationErrorKind::UnsupportedVersion {
                    found: self.version.clone(),
                },
            ));
        }

        if self.providers.is_empty() {
            return Err(ValidationError::missing("providers"));
        }

        let mut seen_names = HashSet::new();
        for (i, provider) in self.providers.iter().enumerate() {
            if !seen_names.insert(&provider.name) {
                return Err(ValidationError::new(
                    format!("providers[{}].name", i),
                    ValidationErrorKind::Duplicate {
                        value: provider.name.clone(),
                    },
                ));
            }

            provider.validate(&format!("providers[{}]", i))?;
        }

        Ok(())
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderConfig {
    /// Validate provider configuration
    pub fn validate(&self, path: &str) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::missing(format!("{}.name", path)));
        }

        if let Some(timeout) = self.timeout_ms {
            if timeout == 0 {
                return Err(ValidationError::not_positive(format!("{}.timeout_ms", path)));
            }
        }

        if let Some(model) = &self.model {
            if model.trim().is_empty() {
                return Err(ValidationError::missing(format!("{}.model", path)));
            }
        }

        if let Some(base_url) = &self.base_url {
            match url::Url::parse(base_url) {
                Ok(url) => {
                    if url.scheme() != "http" && url.scheme() != "https" {
                        return Err(ValidationError::new(
                            format!("{}.base_url", path),
                            ValidationErrorKind::InvalidUrl {
                                reason: format!("scheme '{}'", url.scheme()),
                            },
                        ));
                    }
                }
                Err(e) => {
                    return Err(ValidationError::new(
                        format!("{}.base_url", path),
                        ValidationErrorKind::InvalidUrl {
                            reason: e.to_string(),
                        },
                    ));
                }
            }
        }

        Ok(())
    }
}
