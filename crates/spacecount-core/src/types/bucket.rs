//! Raw count buckets

use super::report::Metric;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One timestamped sample from the counts endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// ISO-8601 start of the bucket
    pub timestamp: String,

    /// Interval payload
    #[serde(default)]
    pub interval: BucketInterval,

    /// Fields the report does not use
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Interval payload of a bucket
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketInterval {
    /// Metric values for the interval
    #[serde(default)]
    pub analytics: Analytics,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Metric values carried by a bucket
///
/// Both fields are optional: a missing or non-numeric value is kept as
/// `None` instead of failing the whole page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    /// Peak occupancy during the interval
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Number of entrances during the interval
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub entrances: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Bucket {
    /// Create a bucket with the given analytics
    pub fn new(timestamp: impl Into<String>, analytics: Analytics) -> Self {
        Self {
            timestamp: timestamp.into(),
            interval: BucketInterval {
                analytics,
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }

    /// Create a placeholder bucket with empty analytics
    pub fn empty_at(timestamp: impl Into<String>) -> Self {
        Self::new(timestamp, Analytics::default())
    }

    /// Extract the value this bucket contributes for `metric`
    ///
    /// Returns `None` when the bucket does not carry that field.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        self.interval.analytics.value(metric)
    }
}

impl Analytics {
    /// Analytics carrying only an occupancy peak
    pub fn with_max(max: f64) -> Self {
        Self {
            max: Some(max),
            ..Self::default()
        }
    }

    /// Analytics carrying only an entrance count
    pub fn with_entrances(entrances: f64) -> Self {
        Self {
            entrances: Some(entrances),
            ..Self::default()
        }
    }

    /// Select the field for `metric`
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Occupancy => self.max,
            Metric::Entrances => self.entrances,
        }
    }
}

fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| v.as_f64()))
}
