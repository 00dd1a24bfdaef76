//! Routing strategies for provider selection and fallback
//!
//! This module implements the priority-ordered fallback chain. Providers are
//! tried strictly one after another in construction order; the first one that
//! produces non-blank text wins and every earlier failure is kept as a
//! diagnostic keyed by provider name.

use crate::config::{HubConfig, MissingCredentialPolicy};
use crate::http::HttpClient;
use crate::protocol::{AttemptOutcome, AttemptResult, Prompt, RoutingOutcome, NO_PROVIDER};
use crate::providers::adapter::Provider;
use crate::providers::error::{ConfigurationError, GenerationError, RoutingError};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Attempt timeout used when neither the builder nor the provider sets one
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

const PROMPT_PREVIEW_CHARS: usize = 50;

/// Trait for routing strategies
#[async_trait]
pub trait RoutingStrategy: Send + Sync {
    /// Route a prompt, aborting if `cancel` fires before a provider succeeds
    async fn route_with_cancellation(
        &self,
        raw_prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<RoutingOutcome, RoutingError>;

    /// Route a prompt to completion
    async fn route(&self, raw_prompt: &str) -> Result<RoutingOutcome, RoutingError> {
        self.route_with_cancellation(raw_prompt, &CancellationToken::new())
            .await
    }

    /// Get the name of this routing strategy
    fn name(&self) -> &str;

    /// Get available providers in order of preference
    fn providers(&self) -> Vec<String>;
}

/// One provider in the chain with its attempt budget
pub struct ChainEntry {
    pub provider: Box<dyn Provider>,
    pub timeout: Duration,
}

/// Sequential, order-preserving fallback across a fixed chain of providers.
///
/// The chain is immutable after construction, so one router can be shared
/// behind an `Arc` by any number of concurrent requests.
pub struct FallbackRouter {
    chain: Vec<ChainEntry>,
}

impl FallbackRouter {
    /// Route a prompt through the chain
    pub async fn route(&self, raw_prompt: &str) -> Result<RoutingOutcome, RoutingError> {
        self.route_with_cancellation(raw_prompt, &CancellationToken::new())
            .await
    }

    /// Route a prompt through the chain.
    ///
    /// When `cancel` fires the in-flight attempt is dropped, the remaining
    /// providers are skipped and [`RoutingError::Cancelled`] is returned.
    pub async fn route_with_cancellation(
        &self,
        raw_prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<RoutingOutcome, RoutingError> {
        // Validation happens before any provider is touched
        let prompt = Prompt::parse(raw_prompt)?;
        let request_id = Uuid::new_v4();

        let span = info_span!("route", request_id = %request_id);
        self.run_chain(prompt, request_id, cancel)
            .instrument(span)
            .await
    }

    async fn run_chain(
        &self,
        prompt: Prompt,
        request_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<RoutingOutcome, RoutingError> {
        info!(
            "[request_id: {}] Routing prompt \"{}\" across {} providers",
            request_id,
            prompt.preview(PROMPT_PREVIEW_CHARS),
            self.chain.len()
        );

        let mut fallback_chain = Vec::with_capacity(self.chain.len());
        let mut errors = BTreeMap::new();
        let mut attempts = Vec::with_capacity(self.chain.len());

        for (index, entry) in self.chain.iter().enumerate() {
            let name = entry.provider.name().to_string();
            fallback_chain.push(name.clone());
            info!(
                "[request_id: {}] Attempt {}/{} with {}",
                request_id,
                index + 1,
                self.chain.len(),
                name
            );

            let started = Instant::now();
            let attempt = tokio::time::timeout(
                entry.timeout,
                entry.provider.generate_text(&prompt, request_id),
            );
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!("[request_id: {}] Cancelled during attempt with {}", request_id, name);
                    return Err(RoutingError::Cancelled);
                }
                result = attempt => result,
            };
            let elapsed_ms = started.elapsed().as_millis() as u64;

            let result = match result {
                Ok(Ok(text)) if text.trim().is_empty() => Err(GenerationError::EmptyResponse),
                Ok(Ok(text)) => Ok(text),
                Ok(Err(err)) => Err(err),
                Err(_) => Err(GenerationError::Timeout(entry.timeout)),
            };

            match result {
                Ok(text) => {
                    info!(
                        "[request_id: {}] {} succeeded in {}ms",
                        request_id, name, elapsed_ms
                    );
                    attempts.push(AttemptResult {
                        provider: name.clone(),
                        outcome: AttemptOutcome::Success { text: text.clone() },
                        elapsed_ms,
                    });
                    return Ok(RoutingOutcome {
                        request_id,
                        success: true,
                        provider: name,
                        response: Some(text),
                        fallback_chain,
                        errors,
                        attempts,
                    });
                }
                Err(err) => {
                    let message = err.to_string();
                    warn!(
                        "[request_id: {}] {} failed after {}ms: {}",
                        request_id, name, elapsed_ms, message
                    );
                    attempts.push(AttemptResult {
                        provider: name.clone(),
                        outcome: AttemptOutcome::Failure {
                            message: message.clone(),
                        },
                        elapsed_ms,
                    });
                    errors.insert(name, message);
                }
            }
        }

        error!(
            "[request_id: {}] All {} providers failed",
            request_id,
            fallback_chain.len()
        );

        Ok(RoutingOutcome {
            request_id,
            success: false,
            provider: NO_PROVIDER.to_string(),
            response: None,
            fallback_chain,
            errors,
            attempts,
        })
    }

    /// Provider names in chain order
    pub fn providers(&self) -> Vec<String> {
        self.chain
            .iter()
            .map(|entry| entry.provider.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

#[async_trait]
impl RoutingStrategy for FallbackRouter {
    async fn route_with_cancellation(
        &self,
        raw_prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<RoutingOutcome, RoutingError> {
        FallbackRouter::route_with_cancellation(self, raw_prompt, cancel).await
    }

    fn name(&self) -> &str {
        "sequential_fallback"
    }

    fn providers(&self) -> Vec<String> {
        FallbackRouter::providers(self)
    }
}

/// Builder for creating a [`FallbackRouter`]
pub struct RoutingBuilder {
    providers: Vec<(Box<dyn Provider>, Option<Duration>)>,
    default_timeout: Duration,
}

impl RoutingBuilder {
    /// Create a new routing builder
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            default_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    /// Append a provider using the default attempt timeout
    pub fn provider(mut self, provider: Box<dyn Provider>) -> Self {
        self.providers.push((provider, None));
        self
    }

    /// Append a provider with its own attempt timeout
    pub fn provider_with_timeout(mut self, provider: Box<dyn Provider>, timeout: Duration) -> Self {
        self.providers.push((provider, Some(timeout)));
        self
    }

    /// Timeout for providers added without one
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Build the router, rejecting empty chains, duplicate names and zero timeouts
    pub fn build(self) -> Result<FallbackRouter, ConfigurationError> {
        if self.providers.is_empty() {
            return Err(ConfigurationError::EmptyChain);
        }

        let mut seen = HashSet::new();
        let mut chain = Vec::with_capacity(self.providers.len());
        for (provider, timeout) in self.providers {
            let name = provider.name().to_string();
            let timeout = timeout.unwrap_or(self.default_timeout);

            if timeout.is_zero() {
                return Err(ConfigurationError::InvalidSetting {
                    field: format!("{}.timeout", name),
                    message: "attempt timeout must be greater than zero".to_string(),
                });
            }
            if !seen.insert(name.clone()) {
                return Err(ConfigurationError::DuplicateProvider(name));
            }

            chain.push(ChainEntry { provider, timeout });
        }

        Ok(FallbackRouter { chain })
    }

    /// Build the chain described by a configuration.
    ///
    /// Providers are constructed in fallback order. A provider without a
    /// credential is skipped or aborts the build depending on
    /// `routing.missing_credential`.
    pub fn from_config(
        config: &HubConfig,
        http: &HttpClient,
    ) -> Result<FallbackRouter, ConfigurationError> {
        let mut builder = Self::new()
            .default_timeout(Duration::from_millis(config.routing.default_timeout_ms));

        for provider_config in config.ordered_providers() {
            match provider_config
                .provider_type
                .create_provider(provider_config, http)
            {
                Ok(provider) => {
                    let key = provider_config
                        .credential()
                        .map(|k| k.partial_redact())
                        .unwrap_or_else(|| "none".to_string());
                    info!(
                        "Registered provider {} ({}, key {})",
                        provider_config.name, provider_config.provider_type, key
                    );
                    builder = builder
                        .provider_with_timeout(provider, config.attempt_timeout(provider_config));
                }
                Err(err @ ConfigurationError::MissingCredential { .. }) => {
                    match config.routing.missing_credential {
                        MissingCredentialPolicy::Exclude => {
                            warn!("Excluding provider from fallback chain: {}", err);
                        }
                        MissingCredentialPolicy::Abort => return Err(err),
                    }
                }
                Err(err) => return Err(err),
            }
        }

        builder.build()
    }
}

impl Default for RoutingBuilder {
    fn default() -> Self {
        Self::new()
    }
}
