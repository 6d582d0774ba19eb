//! Builder pattern for ReportEngine

use crate::config::EngineConfig;
use crate::error::Result;
use crate::report_engine::ReportEngine;
use serde_json::Value;
use spacecount_runtime::{Clock, Fetcher, HttpClient, ReqwestHttpClient, SystemClock, TokioScheduler, TtlCache};
use std::sync::Arc;

/// Builder for ReportEngine
///
/// # Example
///
/// ```rust,ignore
/// use spacecount_sdk::{ClientConfig, EngineConfig, ReportEngineBuilder};
///
/// let engine = ReportEngineBuilder::new()
///     .with_config(EngineConfig::new().with_client(ClientConfig::new("https://api.example.com/v2")))
///     .build()?;
/// ```
pub struct ReportEngineBuilder {
    config: EngineConfig,
    client: Option<Arc<dyn HttpClient>>,
    cache: Option<Arc<TtlCache<Value>>>,
    clock: Option<Arc<dyn Clock>>,
}

impl ReportEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: EngineConfig::new(),
            client: None,
            cache: None,
            clock: None,
        }
    }

    /// Set engine configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Use this HTTP client instead of one built from the client config
    pub fn with_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Share a response cache with other engines
    pub fn with_cache(mut self, cache: Arc<TtlCache<Value>>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Use this clock for "now" and, unless a cache is given, cache expiry
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the engine
    ///
    /// # Errors
    ///
    /// Fails when no client was given and one cannot be built from the
    /// client configuration.
    pub fn build(self) -> Result<ReportEngine> {
        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };

        let client: Arc<dyn HttpClient> = match self.client {
            Some(client) => client,
            None => Arc::new(ReqwestHttpClient::new(&self.config.client)?),
        };

        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(TtlCache::with_clock(clock.clone(), Arc::new(TokioScheduler))));

        let fetcher = Fetcher::new(client, cache).with_page_size(self.config.client.page_size);

        Ok(ReportEngine::new(fetcher, self.config, clock))
    }
}

impl Default for ReportEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
