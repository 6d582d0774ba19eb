//! Spacecount Core - Core types and helpers for hourly space count reports
//!
//! This crate provides the pieces shared across the spacecount workspace:
//! - Domain types (buckets, spaces, report tables)
//! - Banker's rounding
//! - Wire-to-internal key casing
//! - Space-local time helpers and time range resolution
//! - Error types

pub mod casing;
pub mod error;
pub mod rounding;
pub mod time;
pub mod types;

// Re-export commonly used types
pub use casing::{object_snake_to_camel, snake_to_camel};
pub use error::{CoreError, Result};
pub use rounding::bankers_round;
pub use time::{
    convert_time_range_to_days_ago, current_local_time_at_space, format_in_iso_time_at_space,
    parse_iso_time_at_space, RelativeRange, ResolvedTimeRange, TimeRangeSpec, WeekStart,
};
pub use types::{
    Aggregation, Analytics, Bucket, BucketInterval, ColumnData, Metric, Report, ReportCell, Space,
};
