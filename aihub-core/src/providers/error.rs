//! Provider error types and handling

use crate::protocol::PromptError;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Result type for a single provider invocation
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Errors a single provider can return for one request.
///
/// These are always recoverable at the router level: the router records the
/// message and moves on to the next provider in the chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Network or connection error
    #[error("Network error: {0}")]
    Network(String),

    /// The attempt did not finish within its time budget
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Credential rejected by the upstream
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        retry_after: Option<Duration>,
    },

    /// Upstream rejected the request as malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upstream answered 408 or 504
    #[error("Upstream timed out ({status}): {message}")]
    UpstreamTimeout { status: u16, message: String },

    /// Upstream 5xx
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Any other non-success upstream status
    #[error("Upstream error ({status}): {message}")]
    UpstreamStatus { status: u16, message: String },

    /// Upstream answered but the body did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Upstream answered with empty or whitespace-only text
    #[error("Empty response received")]
    EmptyResponse,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        GenerationError::MalformedResponse(err.to_string())
    }
}

/// Errors raised while constructing a provider or a fallback chain.
///
/// These surface at startup, never per request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("provider '{provider}' requires a credential ({env_var} is not set)")]
    MissingCredential { provider: String, env_var: String },

    #[error("unknown provider type '{0}'")]
    UnknownProviderType(String),

    #[error("provider '{0}' appears more than once in the fallback chain")]
    DuplicateProvider(String),

    #[error("fallback chain has no providers")]
    EmptyChain,

    #[error("invalid setting '{field}': {message}")]
    InvalidSetting { field: String, message: String },

    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),
}

/// Errors that cross the router boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// The request was rejected before any provider was tried
    #[error("Validation error: {0}")]
    Validation(#[from] PromptError),

    /// The caller cancelled the request; partial results were discarded
    #[error("Request cancelled")]
    Cancelled,
}

/// Every provider in the chain failed for one request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("All AI providers failed")]
pub struct ExhaustionError {
    /// Provider names in attempt order
    pub fallback_chain: Vec<String>,
    /// Error message per provider
    pub errors: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_response_message() {
        assert_eq!(
            GenerationError::EmptyResponse.to_string(),
            "Empty response received"
        );
    }

    #[test]
    fn test_timeout_message_in_millis() {
        let err = GenerationError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Request timed out after 1500ms");
    }

    #[test]
    fn test_other_message_is_verbatim() {
        assert_eq!(
            GenerationError::Other("401 unauthorized".to_string()).to_string(),
            "401 unauthorized"
        );
    }

    #[test]
    fn test_prompt_error_converts_to_validation() {
        let err: RoutingError = PromptError::Empty.into();
        assert!(matches!(err, RoutingError::Validation(PromptError::Empty)));
    }

    #[test]
    fn test_json_error_is_malformed_response() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: GenerationError = json_err.into();
        assert!(matches!(err, GenerationError::MalformedResponse(_)));
    }
}
