//! Spacecount SDK
//!
//! High-level API for building hourly count reports for a space.

pub mod builder;
pub mod config;
pub mod error;
pub mod report_engine;

// Re-export main types
pub use builder::ReportEngineBuilder;
pub use config::EngineConfig;
pub use error::{Result, SdkError};
pub use report_engine::{ReportEngine, ReportRequest};

// Re-export commonly used types from dependencies
pub use spacecount_core::{Aggregation, ColumnData, Metric, RelativeRange, Report, Space, TimeRangeSpec, WeekStart};
pub use spacecount_runtime::{ClientConfig, HttpClient, TtlCache};
