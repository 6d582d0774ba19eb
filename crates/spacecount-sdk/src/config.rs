//! Configuration types for ReportEngine

use serde::{Deserialize, Serialize};
use spacecount_core::WeekStart;
use spacecount_runtime::ClientConfig;

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// HTTP client settings
    #[serde(default)]
    pub client: ClientConfig,

    /// Lifetime of cached API responses, in milliseconds
    #[serde(default = "default_cache_expiry_ms", alias = "cacheExpiryTimeMs")]
    pub cache_expiry_ms: u64,

    /// Serve repeated requests from the response cache
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Bucket width requested from the counts endpoint
    #[serde(default = "default_interval")]
    pub interval: String,

    /// Ask the API for its slow (uncached, exact) count path
    #[serde(default)]
    pub slow: bool,

    /// First day of the week for week-relative ranges
    #[serde(default, alias = "weekStart")]
    pub week_start: WeekStart,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            cache_expiry_ms: default_cache_expiry_ms(),
            cache_enabled: true,
            interval: default_interval(),
            slow: false,
            week_start: WeekStart::default(),
        }
    }
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP client configuration
    pub fn with_client(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    /// Set the cache lifetime
    pub fn with_cache_expiry_ms(mut self, ms: u64) -> Self {
        self.cache_expiry_ms = ms;
        self
    }

    /// Enable or disable the response cache
    pub fn enable_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Set the bucket interval, e.g. `"1h"` or `"15m"`
    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = interval.into();
        self
    }

    /// Request the slow count path
    pub fn with_slow(mut self, slow: bool) -> Self {
        self.slow = slow;
        self
    }

    /// Set the first day of the week
    pub fn with_week_start(mut self, week_start: WeekStart) -> Self {
        self.week_start = week_start;
        self
    }
}

fn default_cache_expiry_ms() -> u64 {
    5000
}

fn default_interval() -> String {
    "1h".to_string()
}

fn default_true() -> bool {
    true
}
