//! Cell aggregation and table assembly

use super::grouping::{group_buckets, pad_first_column};
use crate::error::{Result, RuntimeError};
use chrono::{DateTime, Datelike, Weekday};
use chrono_tz::Tz;
use spacecount_core::time::{local_midnight, parse_iso_time_in};
use spacecount_core::{bankers_round, Aggregation, Bucket, ColumnData, Metric, ReportCell, Space};
use tracing::{debug, warn};

/// What to aggregate and how
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationParams {
    pub metric: Metric,
    pub aggregation: Aggregation,
    /// Keep buckets that fall on a local Saturday or Sunday
    pub include_weekends: bool,
}

impl AggregationParams {
    pub fn new(metric: Metric, aggregation: Aggregation) -> Self {
        Self {
            metric,
            aggregation,
            include_weekends: true,
        }
    }

    /// Drop weekend buckets before grouping
    pub fn excluding_weekends(mut self) -> Self {
        self.include_weekends = false;
        self
    }
}

/// Combine the buckets of one cell into a single value.
///
/// - `Sum` adds the metric values.
/// - `Average` takes the mean, rounded half-to-even to whole units at 100
///   and above and to one decimal below.
/// - `None` uses the first bucket as-is.
///
/// A bucket missing the metric makes the whole cell `None`, and so does a
/// NaN result.
pub fn aggregate_cell(buckets: &[Bucket], metric: Metric, aggregation: Aggregation) -> ReportCell {
    let value = match aggregation {
        Aggregation::Sum => buckets.iter().map(|b| b.value(metric)).sum::<Option<f64>>(),
        Aggregation::Average => {
            let total = buckets.iter().map(|b| b.value(metric)).sum::<Option<f64>>();
            total.map(|total| {
                let mean = total / buckets.len() as f64;
                if mean >= 100.0 {
                    bankers_round(mean, 0)
                } else {
                    bankers_round(mean, 1)
                }
            })
        }
        Aggregation::None => buckets.first().and_then(|b| b.value(metric)),
    };

    value.filter(|v| !v.is_nan())
}

fn is_weekend(local: &DateTime<Tz>) -> bool {
    matches!(local.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Build the report columns from raw buckets.
///
/// Every calendar computation (weekday, date, hour of day) uses the space's
/// time zone. Buckets are ordered by instant before grouping, and the first
/// column is padded back to local midnight so that row `n` of the first
/// column is hour `n` of its day.
///
/// Buckets with an unreadable timestamp are skipped.
///
/// # Errors
///
/// Returns [`RuntimeError::EmptyInput`] when no bucket is left to aggregate,
/// or a core error when the space's time zone is unknown.
pub fn aggregate_buckets(buckets: Vec<Bucket>, space: &Space, params: &AggregationParams) -> Result<Vec<ColumnData>> {
    let tz = space.tz()?;
    let received = buckets.len();

    let mut localized: Vec<(DateTime<Tz>, Bucket)> = buckets
        .into_iter()
        .filter_map(|bucket| match parse_iso_time_in(&bucket.timestamp, &tz) {
            Ok(local) => Some((local, bucket)),
            Err(e) => {
                warn!("Skipping bucket for space {}: {}", space.id, e);
                None
            }
        })
        .collect();

    if !params.include_weekends {
        localized.retain(|(local, _)| !is_weekend(local));
    }

    if localized.is_empty() {
        return Err(RuntimeError::EmptyInput);
    }

    localized.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut columns = group_buckets(localized, params.aggregation);
    let padded = pad_first_column(&mut columns);

    debug!(
        "Aggregated {} buckets into {} columns for space {} ({} padding rows)",
        received,
        columns.len(),
        space.id,
        padded
    );

    Ok(columns
        .into_iter()
        .map(|column| ColumnData {
            date: local_midnight(column.date, &tz).fixed_offset(),
            values: column
                .bucket_arrays
                .iter()
                .map(|cell| {
                    cell.as_deref()
                        .and_then(|buckets| aggregate_cell(buckets, params.metric, params.aggregation))
                })
                .collect(),
        })
        .collect())
}
