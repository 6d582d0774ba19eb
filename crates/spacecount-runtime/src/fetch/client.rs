use crate::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Query parameters for a request
pub type QueryParams = Map<String, Value>;

/// A decoded API response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Parsed JSON body
    pub data: Value,
}

impl ApiResponse {
    pub fn ok(data: Value) -> Self {
        Self { status: 200, data }
    }
}

/// Turns query parameters into a query string (without the leading `?`)
pub trait ParamsSerializer: Send + Sync {
    fn serialize(&self, params: &QueryParams) -> String;
}

/// Default query string encoding
///
/// Scalars become `key=value`, arrays repeat the key with a `[]` suffix,
/// nulls are omitted and nested objects are sent as JSON. Keys and values
/// are percent-encoded.
#[derive(Debug, Default, Clone, Copy)]
pub struct BracketArraySerializer;

impl BracketArraySerializer {
    fn scalar(value: &Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            other => Some(other.to_string()),
        }
    }
}

impl ParamsSerializer for BracketArraySerializer {
    fn serialize(&self, params: &QueryParams) -> String {
        let mut parts = Vec::new();
        for (key, value) in params {
            let encoded_key = urlencoding::encode(key);
            match value {
                Value::Array(items) => {
                    for item in items {
                        if let Some(v) = Self::scalar(item) {
                            parts.push(format!("{}[]={}", encoded_key, urlencoding::encode(&v)));
                        }
                    }
                }
                other => {
                    if let Some(v) = Self::scalar(other) {
                        parts.push(format!("{}={}", encoded_key, urlencoding::encode(&v)));
                    }
                }
            }
        }
        parts.join("&")
    }
}

/// HTTP transport used by the fetch layer
///
/// Implementations return the parsed body of a successful response and map
/// every failure (network, non-2xx status, undecodable body) to an error.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a GET request
    async fn get(
        &self,
        url: &str,
        params: &QueryParams,
        serializer: Option<&dyn ParamsSerializer>,
    ) -> Result<ApiResponse>;
}
