//! CLI configuration

use serde::{Deserialize, Serialize};
use spacecount_sdk::{EngineConfig, ReportRequest};

/// Default config file, without extension (`.toml`, `.yaml` and `.json` are all accepted)
pub const DEFAULT_CONFIG_FILE: &str = "config/spacecount";

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// The report to run
    #[serde(default)]
    pub report: Option<ReportRequest>,

    /// Log level for the spacecount crates, used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `text` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            report: None,
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

impl CliConfig {
    /// Load configuration from `.env`, the default config file and environment variables
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from the named file and `SPACECOUNT__*` environment variables
    ///
    /// The file is optional. Nested keys use a double underscore, e.g.
    /// `SPACECOUNT__ENGINE__CLIENT__BASE_URL`.
    pub fn load_from(name: &str) -> anyhow::Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();

        let config_result = config::Config::builder()
            .add_source(config::File::with_name(name).required(false))
            .add_source(
                config::Environment::with_prefix("SPACECOUNT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build();

        match config_result {
            Ok(cfg) => cfg
                .try_deserialize()
                .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e)),
            Err(e) => Err(anyhow::anyhow!("Failed to read config {}: {}", name, e)),
        }
    }

    /// Whether logs should be written as JSON lines
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}
