//! HTTP client implementation using reqwest

use crate::config::ConnectionConfig;
use crate::http::error::map_http_error;
use crate::http::RequestOptions;
use crate::providers::error::{ConfigurationError, GenerationError, GenerationResult};
use reqwest::{Client, ClientBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Maximum response size (10MB)
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// Default user agent
const USER_AGENT: &str = concat!("aihub/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client with connection pooling
#[derive(Clone)]
pub struct HttpClient {
    /// The underlying reqwest client
    client: Arc<Client>,

    /// Maximum response size to prevent OOM
    max_response_size: usize,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, ConfigurationError> {
        Self::from_config(&ConnectionConfig::default())
    }

    /// Create a new HTTP client from connection settings
    pub fn from_config(config: &ConnectionConfig) -> Result<Self, ConfigurationError> {
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(config.max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(config.keepalive_secs))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| ConfigurationError::HttpClient(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            max_response_size: MAX_RESPONSE_SIZE,
        })
    }

    /// Override the maximum accepted response size
    pub fn with_max_response_size(mut self, bytes: usize) -> Self {
        self.max_response_size = bytes;
        self
    }

    /// Validate response content type
    fn validate_content_type(response: &Response) -> GenerationResult<()> {
        if let Some(content_type) = response.headers().get("content-type") {
            let content_type_str = content_type.to_str().unwrap_or("").to_lowercase();

            if !content_type_str.contains("application/json") {
                return Err(GenerationError::MalformedResponse(format!(
                    "Expected application/json, got: {}",
                    content_type_str
                )));
            }
        }

        Ok(())
    }

    /// Check response size to prevent OOM
    fn check_content_length(&self, response: &Response) -> GenerationResult<()> {
        if let Some(content_length) = response.content_length() {
            if content_length as usize > self.max_response_size {
                return Err(GenerationError::MalformedResponse(format!(
                    "Response size {} exceeds maximum {}",
                    content_length, self.max_response_size
                )));
            }
        }

        Ok(())
    }

    /// Read a non-success body for its error message.
    ///
    /// Bodies larger than the response size limit are dropped unread.
    async fn read_error_body(&self, mut response: Response) -> Option<String> {
        if self.check_content_length(&response).is_err() {
            return None;
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.ok()? {
            if body.len() + chunk.len() > self.max_response_size {
                return None;
            }
            body.extend_from_slice(&chunk);
        }

        Some(String::from_utf8_lossy(&body).into_owned())
    }

    /// Send one JSON POST request and decode the JSON response.
    ///
    /// `provider` is only used for log lines. Exactly one request is made.
    pub async fn post_json<B, R>(
        &self,
        provider: &str,
        url: &str,
        headers: &[(&str, String)],
        body: &B,
        options: &RequestOptions,
    ) -> GenerationResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request_id = options.request_id;
        debug!(
            "POST {} for {} [request_id: {}]",
            url.split('?').next().unwrap_or(url),
            provider,
            request_id
        );

        let mut req_builder = self
            .client
            .post(url)
            .timeout(options.timeout)
            .json(body)
            .header("X-Request-ID", request_id.to_string());

        for (key, value) in headers {
            req_builder = req_builder.header(*key, value);
        }

        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                warn!("Request timeout for {} [request_id: {}]", provider, request_id);
                GenerationError::Timeout(options.timeout)
            } else if e.is_connect() {
                error!(
                    "Connection error for {} [request_id: {}]: {}",
                    provider, request_id, e
                );
                GenerationError::Network(format!("Connection failed: {}", e))
            } else {
                error!(
                    "Request error for {} [request_id: {}]: {}",
                    provider, request_id, e
                );
                GenerationError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        debug!("Response status: {} [request_id: {}]", status, request_id);

        if !status.is_success() {
            let headers = response.headers().clone();
            let body = self.read_error_body(response).await;

            warn!(
                "Request failed with status {} for {} [request_id: {}]",
                status, provider, request_id
            );

            return Err(map_http_error(status, Some(&headers), body));
        }

        Self::validate_content_type(&response)?;
        self.check_content_length(&response)?;

        let response_text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout(options.timeout)
            } else {
                GenerationError::Network(format!("Failed to read response body: {}", e))
            }
        })?;

        if response_text.len() > self.max_response_size {
            return Err(GenerationError::MalformedResponse(format!(
                "Response size {} exceeds maximum {}",
                response_text.len(),
                self.max_response_size
            )));
        }

        serde_json::from_str(&response_text).map_err(|e| {
            error!(
                "Failed to parse response from {} [request_id: {}]: {}",
                provider, request_id, e
            );
            GenerationError::MalformedResponse(format!("Invalid response format: {}", e))
        })
    }
}
