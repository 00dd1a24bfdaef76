//! API error responses

use aihub_core::providers::{ExhaustionError, RoutingError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::error;

/// Message returned for a missing, empty or non-string prompt
pub const INVALID_PROMPT_MESSAGE: &str = "Valid prompt is required";

/// Message returned for faults outside the routing contract
pub const INTERNAL_ERROR_MESSAGE: &str = "AI processing failed";

/// Errors returned by the `/api/ai` handler
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Valid prompt is required")]
    InvalidPrompt,

    #[error(transparent)]
    Exhausted(#[from] ExhaustionError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidPrompt => StatusCode::BAD_REQUEST,
            Self::Exhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RoutingError> for ApiError {
    fn from(err: RoutingError) -> Self {
        match err {
            RoutingError::Validation(_) => Self::InvalidPrompt,
            RoutingError::Cancelled => Self::Internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExhaustionMetadata {
    fallback_chain: Vec<String>,
    errors: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<ExhaustionMetadata>,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            metadata: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Internal details stay in the logs
        let body = match self {
            Self::InvalidPrompt => ErrorBody::new(INVALID_PROMPT_MESSAGE),
            Self::Exhausted(err) => ErrorBody {
                success: false,
                error: err.to_string(),
                metadata: Some(ExhaustionMetadata {
                    fallback_chain: err.fallback_chain,
                    errors: err.errors,
                }),
            },
            Self::Internal(detail) => {
                error!("AI processing failed: {}", detail);
                ErrorBody::new(INTERNAL_ERROR_MESSAGE)
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Response for a panic caught by the panic layer
pub fn panic_response(_panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    ApiError::Internal("handler panicked".to_string()).into_response()
}
