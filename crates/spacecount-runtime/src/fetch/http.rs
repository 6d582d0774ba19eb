//! `reqwest`-backed HTTP client

use super::client::{ApiResponse, BracketArraySerializer, HttpClient, ParamsSerializer, QueryParams};
use super::pagination::DEFAULT_PAGE_SIZE;
use crate::error::{Result, RuntimeError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL that relative request paths are joined onto
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Headers sent with every request
    #[serde(default)]
    pub default_headers: HashMap<String, String>,

    /// Items requested per page by paginated fetches
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            default_headers: HashMap::new(),
            page_size: default_page_size(),
        }
    }
}

impl ClientConfig {
    /// Configuration for the given base URL with default settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Add a header sent with every request
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// HTTP client backed by `reqwest`
pub struct ReqwestHttpClient {
    client: Client,
    base_url: String,
}

impl ReqwestHttpClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns an error if a default header is not a valid HTTP header or
    /// the underlying client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RuntimeError::Transport(format!("Invalid header name {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| RuntimeError::Transport(format!("Invalid value for header {}: {}", name, e)))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|e| RuntimeError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Join a request path onto the base URL; absolute URLs pass through
    fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(
        &self,
        url: &str,
        params: &QueryParams,
        serializer: Option<&dyn ParamsSerializer>,
    ) -> Result<ApiResponse> {
        let serializer = serializer.unwrap_or(&BracketArraySerializer);
        let query = serializer.serialize(params);

        let mut full_url = self.resolve_url(url);
        if !query.is_empty() {
            full_url.push(if full_url.contains('?') { '&' } else { '?' });
            full_url.push_str(&query);
        }

        tracing::debug!("GET {}", full_url);

        let response = self
            .client
            .get(&full_url)
            .send()
            .await
            .map_err(|e| RuntimeError::Transport(format!("HTTP request to {} failed: {}", full_url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RuntimeError::Status {
                url: full_url,
                status: status.as_u16(),
            });
        }

        let data = response
            .json()
            .await
            .map_err(|e| RuntimeError::Decode(format!("Failed to parse JSON from {}: {}", full_url, e)))?;

        Ok(ApiResponse {
            status: status.as_u16(),
            data,
        })
    }
}

fn default_base_url() -> String {
    "https://api.density.io/v2".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}
