use serde_json::Value;

/// Build the cache key for a request.
///
/// Parameters and body are serialized canonically (object keys sorted at
/// every depth), so requests that differ only in key order share a key.
pub fn cache_key(url: &str, params: &Value, body: &Value) -> String {
    format!("{} {} {}", url, canonical_json(params), canonical_json(body))
}

/// Compact JSON with object keys sorted recursively
pub fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let body: Vec<String> = entries
                .into_iter()
                .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), canonical_json(v)))
                .collect();
            format!("{{{}}}", body.join(","))
        }
        Value::Array(items) => {
            let body: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", body.join(","))
        }
        scalar => scalar.to_string(),
    }
}
