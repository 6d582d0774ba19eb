//! Spacecount report runner
//!
//! Builds the configured hourly report and prints it as JSON.

mod config;

use crate::config::{CliConfig, DEFAULT_CONFIG_FILE};
use anyhow::Result;
use spacecount_sdk::ReportEngineBuilder;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Optional config file name as the only argument
    let config_file = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
    let config = CliConfig::load_from(&config_file)?;

    init_tracing(&config)?;
    info!("Loaded configuration from {}", config_file);

    let request = config
        .report
        .clone()
        .ok_or_else(|| anyhow::anyhow!("No report configured: add a [report] section to {}", config_file))?;

    let engine = ReportEngineBuilder::new().with_config(config.engine.clone()).build()?;

    info!(
        "Running {} report for space {} (aggregation {})",
        request.metric, request.space_id, request.aggregation
    );
    let report = engine.hourly_report(&request).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Initialize tracing; logs go to stderr so stdout carries only the report
fn init_tracing(config: &CliConfig) -> Result<()> {
    let level = &config.log_level;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "spacecount_cli={level},spacecount_sdk={level},spacecount_runtime={level}"
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json_logs() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}
