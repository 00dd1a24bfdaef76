//! HTTP client module for making API requests to generation providers
//!
//! This module implements the HTTP layer used by the concrete adapters:
//! - Connection pooling and client management
//! - Error mapping from upstream status codes
//! - Request ID generation and correlation

pub mod client;
pub mod error;

pub use client::HttpClient;
pub use error::{map_http_error, parse_retry_after};

use std::time::Duration;
use uuid::Uuid;

/// Options for an HTTP request
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Unique request ID for correlation
    pub request_id: Uuid,

    /// Request timeout
    pub timeout: Duration,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RequestOptions {
    /// Create new request options with a generated request ID
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout for this request
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reuse an existing request ID
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }
}
