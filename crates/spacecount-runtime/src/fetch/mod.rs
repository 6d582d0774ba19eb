//! API fetch layer
//!
//! Everything that talks to the counts API goes through [`Fetcher`], which
//! puts the request cache in front of a pluggable [`HttpClient`].

mod client;
mod fetcher;
mod http;
mod pagination;

pub use client::{ApiResponse, BracketArraySerializer, HttpClient, ParamsSerializer, QueryParams};
pub use fetcher::{FetchOptions, Fetcher, DEFAULT_CACHE_EXPIRY_MS};
pub use http::{ClientConfig, ReqwestHttpClient};
pub use pagination::{fetch_all_pages, Page, DEFAULT_PAGE_SIZE};
