//! ReportEngine - builds hourly count reports

use crate::config::EngineConfig;
use crate::error::{Result, SdkError};
use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use spacecount_core::{
    convert_time_range_to_days_ago, current_local_time_at_space, format_in_iso_time_at_space,
    parse_iso_time_at_space, Aggregation, Bucket, Metric, Report, Space, TimeRangeSpec,
};
use spacecount_runtime::{aggregate_buckets, AggregationParams, Clock, FetchOptions, Fetcher};
use std::sync::Arc;
use tracing::{debug, info};

/// Report request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    /// Space to report on
    #[serde(alias = "spaceId")]
    pub space_id: String,

    /// Range to cover
    #[serde(alias = "timeRange")]
    pub time_range: TimeRangeSpec,

    /// Which bucket field to report
    #[serde(default = "default_metric")]
    pub metric: Metric,

    /// How to combine buckets that share a cell
    #[serde(default)]
    pub aggregation: Aggregation,

    /// Reference date for relative ranges, read in the space's time zone;
    /// defaults to now
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl ReportRequest {
    /// Create a request for an occupancy report with no aggregation
    pub fn new(space_id: impl Into<String>, time_range: TimeRangeSpec) -> Self {
        Self {
            space_id: space_id.into(),
            time_range,
            metric: default_metric(),
            aggregation: Aggregation::None,
            date: None,
        }
    }

    /// Set the metric
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the aggregation
    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Resolve relative ranges against this date instead of now
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }
}

fn default_metric() -> Metric {
    Metric::Occupancy
}

/// Report engine
pub struct ReportEngine {
    fetcher: Fetcher,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
}

impl ReportEngine {
    pub(crate) fn new(fetcher: Fetcher, config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self { fetcher, config, clock }
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The fetcher, and through it the response cache
    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Build an hourly report
    ///
    /// Fetches the space (for its time zone), resolves the requested range
    /// at the space, fetches every count bucket in that range and aggregates
    /// them into columns.
    ///
    /// # Errors
    ///
    /// Fails on any transport error, on a space or bucket payload that does
    /// not decode, on an invalid time range, and when the range holds no
    /// buckets to report.
    pub async fn hourly_report(&self, request: &ReportRequest) -> Result<Report> {
        let space = self.fetch_space(&request.space_id).await?;

        let reference = self.reference_time(request, &space)?;
        let range = convert_time_range_to_days_ago(&reference, &request.time_range, self.config.week_start)?;
        debug!(
            "Report range for space {}: {} .. {} ({} to {} days ago)",
            space.id,
            range.start.to_rfc3339(),
            range.end.to_rfc3339(),
            range.start_days_ago,
            range.end_days_ago
        );

        let start_time = format_in_iso_time_at_space(&range.start, &space)?;
        let end_time = format_in_iso_time_at_space(&range.end, &space)?;
        let buckets = self.fetch_buckets(request, &start_time, &end_time).await?;

        let mut params = AggregationParams::new(request.metric, request.aggregation);
        params.include_weekends = request.time_range.include_weekends;
        let data = aggregate_buckets(buckets, &space, &params)?;

        info!(
            "Built {} report for space {}: {} columns, {} rows",
            request.metric,
            space.id,
            data.len(),
            data.iter().map(|c| c.values.len()).max().unwrap_or(0)
        );

        Ok(Report {
            start_date: range.start.fixed_offset(),
            end_date: range.end.fixed_offset(),
            space,
            data,
            metric: request.metric,
            aggregation: request.aggregation,
        })
    }

    fn fetch_options(&self) -> FetchOptions {
        FetchOptions::new()
            .with_cache(self.config.cache_enabled)
            .with_cache_expiry_ms(self.config.cache_expiry_ms)
    }

    async fn fetch_space(&self, space_id: &str) -> Result<Space> {
        let url = format!("/spaces/{}", space_id);
        let value = self.fetcher.fetch_object(&url, &self.fetch_options()).await?;
        serde_json::from_value(value)
            .map_err(|e| SdkError::InvalidResponse(format!("Space {} does not decode: {}", space_id, e)))
    }

    fn reference_time(&self, request: &ReportRequest, space: &Space) -> Result<DateTime<Tz>> {
        match &request.date {
            Some(date) => Ok(parse_iso_time_at_space(date, space)?),
            None => Ok(current_local_time_at_space(space, self.clock.utc_now())?),
        }
    }

    async fn fetch_buckets(&self, request: &ReportRequest, start_time: &str, end_time: &str) -> Result<Vec<Bucket>> {
        let mut options = self
            .fetch_options()
            .with_param("interval", self.config.interval.as_str())
            .with_param("start_time", start_time)
            .with_param("end_time", end_time)
            .skip_camel(true);
        if self.config.slow {
            options = options.with_param("slow", "true");
        }

        let url = format!("/spaces/{}/counts", request.space_id);
        let items = self.fetcher.fetch_all_objects(&url, &options).await?;
        debug!("Fetched {} buckets for space {}", items.len(), request.space_id);

        items
            .into_iter()
            .map(|item: Value| {
                serde_json::from_value(item)
                    .map_err(|e| SdkError::InvalidResponse(format!("Bucket for space {} does not decode: {}", request.space_id, e)))
            })
            .collect()
    }
}
