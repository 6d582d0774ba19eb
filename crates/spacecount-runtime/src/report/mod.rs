//! Hourly report aggregation
//!
//! Turns the flat bucket list returned by the counts endpoint into the
//! report table: one column per local date (or weekday), one row per hour
//! offset from the column's first bucket.

mod aggregator;
mod grouping;

pub use aggregator::{aggregate_buckets, aggregate_cell, AggregationParams};
pub use grouping::{group_buckets, pad_first_column, BucketColumn};
