//! HTTP error mapping utilities

use crate::providers::error::GenerationError;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

/// Upstream error messages longer than this are cut off
pub const MAX_ERROR_MESSAGE_CHARS: usize = 512;

/// Map an upstream HTTP status and response body to a [`GenerationError`]
pub fn map_http_error(
    status: StatusCode,
    headers: Option<&HeaderMap>,
    body: Option<String>,
) -> GenerationError {
    let upstream_message = body
        .as_deref()
        .and_then(|b| serde_json::from_str::<Value>(b).ok())
        .and_then(|v| extract_error_message(&v));

    let error_message = upstream_message
        .or_else(|| body.filter(|b| !b.trim().is_empty()))
        .map(truncate_message)
        .unwrap_or_else(|| format!("HTTP error {}", status.as_u16()));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GenerationError::Authentication(error_message)
        }

        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = headers
                .and_then(|h| h.get(RETRY_AFTER))
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);

            GenerationError::RateLimit {
                message: error_message,
                retry_after,
            }
        }

        StatusCode::BAD_REQUEST => GenerationError::InvalidRequest(error_message),

        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            GenerationError::UpstreamTimeout {
                status: status.as_u16(),
                message: error_message,
            }
        }

        status if status.is_server_error() => GenerationError::ServerError {
            status: status.as_u16(),
            message: error_message,
        },

        status => GenerationError::UpstreamStatus {
            status: status.as_u16(),
            message: error_message,
        },
    }
}

fn truncate_message(mut message: String) -> String {
    if let Some((end, _)) = message.char_indices().nth(MAX_ERROR_MESSAGE_CHARS) {
        message.truncate(end);
        message.push_str("...");
    }
    message
}

/// Extract a human-readable message from common error body shapes
fn extract_error_message(json: &Value) -> Option<String> {
    // OpenAI-compatible and Gemini: { "error": { "message": "..." } }
    if let Some(message) = json
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|v| v.as_str())
    {
        return Some(message.to_string());
    }

    // Generic: { "message": "..." } or { "error": "..." }
    if let Some(message) = json.get("message").and_then(|v| v.as_str()) {
        return Some(message.to_string());
    }

    json.get("error")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Parse a Retry-After header value given in seconds
pub fn parse_retry_after(header_value: &str) -> Option<Duration> {
    // HTTP-date values are not handled
    header_value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
