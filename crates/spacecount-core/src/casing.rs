//! Wire-to-internal key casing
//!
//! The counts API speaks `snake_case`; report consumers expect `camelCase`.

use serde_json::{Map, Value};

/// Convert a single `snake_case` identifier to `camelCase`.
///
/// Leading underscores are kept so private-looking keys stay distinguishable.
pub fn snake_to_camel(key: &str) -> String {
    let prefix_len = key.len() - key.trim_start_matches('_').len();
    let (prefix, rest) = key.split_at(prefix_len);

    let mut out = String::with_capacity(key.len());
    out.push_str(prefix);

    let mut upper_next = false;
    for ch in rest.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }

    // A trailing underscore has nothing to capitalize; keep it
    if upper_next {
        out.push('_');
    }

    out
}

/// Recursively rename every object key in `value` from `snake_case` to `camelCase`.
///
/// Arrays are walked element by element; scalars are returned unchanged.
pub fn object_snake_to_camel(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let converted: Map<String, Value> = map
                .into_iter()
                .map(|(key, inner)| (snake_to_camel(&key), object_snake_to_camel(inner)))
                .collect();
            Value::Object(converted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(object_snake_to_camel).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snake_to_camel() {
        assert_eq!(snake_to_camel("time_zone"), "timeZone");
        assert_eq!(snake_to_camel("current_count_updated_at"), "currentCountUpdatedAt");
        assert_eq!(snake_to_camel("id"), "id");
        assert_eq!(snake_to_camel("alreadyCamel"), "alreadyCamel");
    }

    #[test]
    fn test_snake_to_camel_edge_underscores() {
        assert_eq!(snake_to_camel("_private_key"), "_privateKey");
        assert_eq!(snake_to_camel("trailing_"), "trailing_");
        assert_eq!(snake_to_camel(""), "");
    }

    #[test]
    fn test_object_snake_to_camel_nested() {
        let input = json!({
            "time_zone": "America/New_York",
            "daily_reset": {"reset_time": "04:00"},
            "doorways": [{"doorway_id": 1}, 2]
        });

        let output = object_snake_to_camel(input);
        assert_eq!(
            output,
            json!({
                "timeZone": "America/New_York",
                "dailyReset": {"resetTime": "04:00"},
                "doorways": [{"doorwayId": 1}, 2]
            })
        );
    }

    #[test]
    fn test_object_snake_to_camel_scalar_passthrough() {
        assert_eq!(object_snake_to_camel(json!(42)), json!(42));
        assert_eq!(object_snake_to_camel(json!("some_string")), json!("some_string"));
    }
}
