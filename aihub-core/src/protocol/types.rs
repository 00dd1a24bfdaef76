//! Core protocol types for a generation request
//!
//! The design prioritizes:
//! - Validation at the boundary (an empty prompt never reaches a provider)
//! - A complete diagnostic trail of every provider that was tried
//! - Request-local data with no shared mutable state

use crate::providers::error::ExhaustionError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Provider name reported when no provider succeeded
pub const NO_PROVIDER: &str = "None";

/// Reasons a raw prompt is rejected before dispatch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    /// The prompt is empty or contains only whitespace
    #[error("prompt must not be empty")]
    Empty,
}

/// A non-empty prompt supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Prompt(String);

impl Prompt {
    /// Validate a raw prompt. The text is kept exactly as supplied.
    pub fn parse(raw: &str) -> Result<Self, PromptError> {
        if raw.trim().is_empty() {
            return Err(PromptError::Empty);
        }
        Ok(Self(raw.to_string()))
    }

    /// The prompt text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `max_chars` characters, for log lines
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.0.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Prompt {
    type Error = PromptError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

/// Outcome of invoking a single provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// The provider produced non-empty text
    Success { text: String },
    /// The provider failed or produced no usable text
    Failure { message: String },
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Per-provider record of one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResult {
    /// Name of the provider that was invoked
    pub provider: String,

    /// What the provider returned
    pub outcome: AttemptOutcome,

    /// Wall-clock time spent on the attempt
    pub elapsed_ms: u64,
}

/// Final result of routing one prompt through the fallback chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingOutcome {
    /// Correlation ID used in log lines for this request
    pub request_id: Uuid,

    /// Whether any provider produced text
    pub success: bool,

    /// Winning provider, or [`NO_PROVIDER`]
    pub provider: String,

    /// Generated text from the winning provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    /// Provider names in the order they were attempted
    pub fallback_chain: Vec<String>,

    /// Error message per failed provider
    pub errors: BTreeMap<String, String>,

    /// Detailed attempt records, in attempt order
    pub attempts: Vec<AttemptResult>,
}

impl RoutingOutcome {
    /// Whether the winning provider was not the first one tried
    pub fn fallback_occurred(&self) -> bool {
        self.fallback_chain.len() > 1
    }

    /// Names of providers that failed, in attempt order
    pub fn failed_providers(&self) -> Vec<String> {
        self.attempts
            .iter()
            .filter(|a| !a.outcome.is_success())
            .map(|a| a.provider.clone())
            .collect()
    }

    /// Convert an exhausted outcome into the aggregate error
    pub fn into_result(self) -> Result<RoutingOutcome, ExhaustionError> {
        if self.success {
            Ok(self)
        } else {
            Err(ExhaustionError {
                fallback_chain: self.fallback_chain,
                errors: self.errors,
            })
        }
    }
}
