//! Domain types shared by the fetch layer and the report aggregator

pub mod bucket;
pub mod report;
pub mod space;

pub use bucket::{Analytics, Bucket, BucketInterval};
pub use report::{Aggregation, ColumnData, Metric, Report, ReportCell};
pub use space::Space;
