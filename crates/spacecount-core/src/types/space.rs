//! Space metadata as returned by the spaces endpoint

use crate::error::{CoreError, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A physical space whose counts are being reported
///
/// Only the fields the report needs are typed; everything else the API
/// returns is kept in `extra` so the report can echo the full metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    /// Space identifier (the API uses both numeric and string ids)
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// IANA time zone identifier, e.g. `America/New_York`
    pub time_zone: String,

    /// Remaining metadata, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Space {
    /// Create a space with just an id and a time zone
    pub fn new(id: impl Into<String>, time_zone: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            time_zone: time_zone.into(),
            extra: Map::new(),
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Resolve the space's time zone
    pub fn tz(&self) -> Result<Tz> {
        self.time_zone
            .parse::<Tz>()
            .map_err(|_| CoreError::InvalidTimeZone(self.time_zone.clone()))
    }
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "space id must be a string or number, got {}",
            other
        ))),
    }
}
