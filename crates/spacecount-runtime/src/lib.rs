//! Spacecount Runtime - fetching and aggregation engine for hourly space reports
//!
//! This crate provides:
//! - A TTL cache with an injected clock and expiry scheduler
//! - The HTTP client seam and its `reqwest` implementation
//! - Paginated and single-object fetches behind the cache
//! - The bucket aggregator that builds the report table

pub mod cache;
pub mod error;
pub mod fetch;
pub mod report;

// Re-export main types
pub use cache::{
    cache_key, CacheStats, Clock, ExpiryScheduler, ManualClock, ManualScheduler, SystemClock,
    TokioScheduler, TtlCache,
};
pub use error::{Result, RuntimeError};
pub use fetch::{
    fetch_all_pages, ApiResponse, BracketArraySerializer, ClientConfig, FetchOptions, Fetcher,
    HttpClient, Page, ParamsSerializer, QueryParams, ReqwestHttpClient, DEFAULT_PAGE_SIZE,
};
pub use report::{aggregate_buckets, aggregate_cell, group_buckets, pad_first_column, AggregationParams, BucketColumn};
