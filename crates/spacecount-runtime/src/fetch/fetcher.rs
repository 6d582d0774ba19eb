//! Cached list and object fetches

use super::client::{HttpClient, ParamsSerializer, QueryParams};
use super::pagination::{fetch_all_pages, Page, DEFAULT_PAGE_SIZE};
use crate::cache::{cache_key, TtlCache};
use crate::error::Result;
use serde_json::{json, Value};
use spacecount_core::object_snake_to_camel;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default lifetime of a cached response
pub const DEFAULT_CACHE_EXPIRY_MS: u64 = 5000;

/// Per-request fetch options
#[derive(Clone)]
pub struct FetchOptions {
    /// Read from and populate the cache
    pub cache: bool,
    /// How long a cached response stays valid
    pub cache_expiry: Duration,
    /// Query parameters
    pub params: QueryParams,
    /// Request body; only part of the cache key for GET requests
    pub body: Value,
    /// Return wire keys as-is instead of camel-casing them
    pub skip_camel: bool,
    /// Custom query string encoding
    pub params_serializer: Option<Arc<dyn ParamsSerializer>>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            cache: true,
            cache_expiry: Duration::from_millis(DEFAULT_CACHE_EXPIRY_MS),
            params: QueryParams::new(),
            body: json!({}),
            skip_camel: false,
            params_serializer: None,
        }
    }
}

impl fmt::Debug for FetchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchOptions")
            .field("cache", &self.cache)
            .field("cache_expiry", &self.cache_expiry)
            .field("params", &self.params)
            .field("body", &self.body)
            .field("skip_camel", &self.skip_camel)
            .field("params_serializer", &self.params_serializer.is_some())
            .finish()
    }
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the cache for this request
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache = enabled;
        self
    }

    /// Set the cache lifetime in milliseconds
    pub fn with_cache_expiry_ms(mut self, ms: u64) -> Self {
        self.cache_expiry = Duration::from_millis(ms);
        self
    }

    /// Replace all query parameters
    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    /// Add one query parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set the request body
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Keep wire key casing
    pub fn skip_camel(mut self, skip: bool) -> Self {
        self.skip_camel = skip;
        self
    }

    /// Use a custom query string encoding
    pub fn with_params_serializer(mut self, serializer: Arc<dyn ParamsSerializer>) -> Self {
        self.params_serializer = Some(serializer);
        self
    }

    fn cache_key(&self, url: &str) -> String {
        cache_key(url, &Value::Object(self.params.clone()), &self.body)
    }
}

/// Fetches API data through the response cache
///
/// Both fetch paths cache the raw response payload (before key casing),
/// so a cache hit and a fresh fetch return the same shape. Failed fetches
/// are never cached.
pub struct Fetcher {
    client: Arc<dyn HttpClient>,
    cache: Arc<TtlCache<Value>>,
    page_size: usize,
}

impl Fetcher {
    /// Create a fetcher over `client` sharing `cache`
    pub fn new(client: Arc<dyn HttpClient>, cache: Arc<TtlCache<Value>>) -> Self {
        Self {
            client,
            cache,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the number of items requested per page
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// The shared response cache
    pub fn cache(&self) -> &Arc<TtlCache<Value>> {
        &self.cache
    }

    /// Fetch every page of a list endpoint and return all items
    ///
    /// # Errors
    ///
    /// Returns the first transport or decode error from any page.
    pub async fn fetch_all_objects(&self, url: &str, options: &FetchOptions) -> Result<Vec<Value>> {
        let raw = if options.cache {
            let key = options.cache_key(url);
            self.cache
                .get_or_try_insert_with(&key, options.cache_expiry, || self.fetch_pages(url, options))
                .await?
        } else {
            self.fetch_pages(url, options).await?
        };

        let items = match raw {
            Value::Array(items) => items,
            other => vec![other],
        };

        if options.skip_camel {
            return Ok(items);
        }
        Ok(items.into_iter().map(object_snake_to_camel).collect())
    }

    /// Fetch a single object
    ///
    /// # Errors
    ///
    /// Returns the transport or decode error from the request.
    pub async fn fetch_object(&self, url: &str, options: &FetchOptions) -> Result<Value> {
        let data = if options.cache {
            let key = options.cache_key(url);
            self.cache
                .get_or_try_insert_with(&key, options.cache_expiry, || self.fetch_single(url, options))
                .await?
        } else {
            self.fetch_single(url, options).await?
        };

        if options.skip_camel {
            return Ok(data);
        }
        Ok(object_snake_to_camel(data))
    }

    async fn fetch_pages(&self, url: &str, options: &FetchOptions) -> Result<Value> {
        let serializer = options.params_serializer.as_deref();
        let items = fetch_all_pages(self.page_size, |page| {
            let mut params = options.params.clone();
            params.insert("page".to_string(), json!(page));
            params.insert("page_size".to_string(), json!(self.page_size));
            async move {
                let response = self.client.get(url, &params, serializer).await?;
                Page::from_json(response.data)
            }
        })
        .await?;

        Ok(Value::Array(items))
    }

    async fn fetch_single(&self, url: &str, options: &FetchOptions) -> Result<Value> {
        let response = self
            .client
            .get(url, &options.params, options.params_serializer.as_deref())
            .await?;
        Ok(response.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ManualClock, ManualScheduler};
    use crate::error::RuntimeError;
    use crate::fetch::client::ApiResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves `pages[page - 1]` for list calls and `object` otherwise
    struct FakeClient {
        pages: Vec<Value>,
        object: Value,
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakeClient {
        fn new(pages: Vec<Value>, object: Value) -> Self {
            Self {
                pages,
                object,
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(Vec::new(), Value::Null)
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HttpClient for FakeClient {
        async fn get(
            &self,
            url: &str,
            params: &QueryParams,
            _serializer: Option<&dyn ParamsSerializer>,
        ) -> Result<ApiResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RuntimeError::Status {
                    url: url.to_string(),
                    status: 503,
                });
            }
            match params.get("page").and_then(Value::as_u64) {
                Some(page) => Ok(ApiResponse::ok(
                    self.pages.get(page as usize - 1).cloned().unwrap_or_else(|| json!([])),
                )),
                None => Ok(ApiResponse::ok(self.object.clone())),
            }
        }
    }

    fn fetcher(client: Arc<FakeClient>) -> (Fetcher, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let scheduler = Arc::new(ManualScheduler::new(clock.clone()));
        let cache = Arc::new(TtlCache::with_clock(clock.clone(), scheduler));
        (Fetcher::new(client, cache).with_page_size(2), clock)
    }

    #[tokio::test]
    async fn test_fetch_all_objects_walks_pages_and_camel_cases() {
        let client = Arc::new(FakeClient::new(
            vec![
                json!([{"space_id": 1}, {"space_id": 2}]),
                json!([{"space_id": 3}]),
            ],
            Value::Null,
        ));
        let (fetcher, _) = fetcher(client.clone());

        let items = fetcher.fetch_all_objects("/items", &FetchOptions::new()).await.unwrap();
        assert_eq!(items, vec![json!({"spaceId": 1}), json!({"spaceId": 2}), json!({"spaceId": 3})]);
        assert_eq!(client.calls(), 2);

        // Served from cache, still camel-cased
        let again = fetcher.fetch_all_objects("/items", &FetchOptions::new()).await.unwrap();
        assert_eq!(again, items);
        assert_eq!(client.calls(), 2);

        // Same cache entry, raw keys
        let raw = fetcher
            .fetch_all_objects("/items", &FetchOptions::new().skip_camel(true))
            .await
            .unwrap();
        assert_eq!(raw[0], json!({"space_id": 1}));
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_expires_and_can_be_bypassed() {
        let client = Arc::new(FakeClient::new(vec![json!([1])], Value::Null));
        let (fetcher, clock) = fetcher(client.clone());
        let options = FetchOptions::new().with_cache_expiry_ms(100);

        fetcher.fetch_all_objects("/items", &options).await.unwrap();
        clock.advance(Duration::from_millis(99));
        fetcher.fetch_all_objects("/items", &options).await.unwrap();
        assert_eq!(client.calls(), 1);

        clock.advance(Duration::from_millis(1));
        fetcher.fetch_all_objects("/items", &options).await.unwrap();
        assert_eq!(client.calls(), 2);

        fetcher
            .fetch_all_objects("/items", &options.clone().with_cache(false))
            .await
            .unwrap();
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn test_fetch_object_hit_and_miss_have_same_shape() {
        let client = Arc::new(FakeClient::new(Vec::new(), json!({"time_zone": "UTC"})));
        let (fetcher, _) = fetcher(client.clone());

        let miss = fetcher.fetch_object("/spaces/1", &FetchOptions::new()).await.unwrap();
        let hit = fetcher.fetch_object("/spaces/1", &FetchOptions::new()).await.unwrap();

        assert_eq!(miss, json!({"timeZone": "UTC"}));
        assert_eq!(hit, miss);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let client = Arc::new(FakeClient::failing());
        let (fetcher, _) = fetcher(client.clone());

        let err = fetcher.fetch_object("/spaces/1", &FetchOptions::new()).await.unwrap_err();
        assert!(err.is_transport());
        assert!(fetcher.fetch_all_objects("/items", &FetchOptions::new()).await.is_err());
        assert!(fetcher.cache().is_empty());

        fetcher.fetch_object("/spaces/1", &FetchOptions::new()).await.unwrap_err();
        assert_eq!(client.calls(), 3);
    }

    #[test]
    fn test_fetch_options_defaults() {
        let options = FetchOptions::default();
        assert!(options.cache);
        assert_eq!(options.cache_expiry, Duration::from_millis(5000));
        assert!(options.params.is_empty());
        assert_eq!(options.body, json!({}));
        assert!(!options.skip_camel);
        assert!(options.params_serializer.is_none());
    }

    #[test]
    fn test_fetch_options_builder() {
        let options = FetchOptions::new()
            .with_cache(false)
            .with_cache_expiry_ms(100)
            .with_param("interval", "1h")
            .skip_camel(true);

        assert!(!options.cache);
        assert_eq!(options.cache_expiry, Duration::from_millis(100));
        assert_eq!(options.params.get("interval"), Some(&json!("1h")));
        assert!(options.skip_camel);
        assert!(format!("{:?}", options).contains("FetchOptions"));
    }

    #[test]
    fn test_cache_key_covers_params_and_body() {
        let a = FetchOptions::new().with_param("a", 1);
        let b = FetchOptions::new().with_param("a", 2);
        let c = FetchOptions::new().with_param("a", 1).with_body(json!({"x": 1}));

        assert_ne!(a.cache_key("/u"), b.cache_key("/u"));
        assert_ne!(a.cache_key("/u"), c.cache_key("/u"));
        assert_eq!(a.cache_key("/u"), FetchOptions::new().with_param("a", 1).cache_key("/u"));
    }
}
