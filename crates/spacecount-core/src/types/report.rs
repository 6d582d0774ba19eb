//! Report table types

use super::space::Space;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single report cell: a number, or `None` when the cell has no data
///
/// `None` is distinct from `Some(0.0)`; NaN never appears in a report.
pub type ReportCell = Option<f64>;

/// Which bucket field feeds the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Metric {
    /// Peak occupancy (`analytics.max`)
    Occupancy,
    /// Entrance count (`analytics.entrances`)
    Entrances,
}

impl Metric {
    /// Parse a metric label
    ///
    /// `"occupancy"` selects the occupancy peak; every other label selects
    /// entrances, matching how report configurations have always been read.
    pub fn from_label(label: &str) -> Self {
        if label.eq_ignore_ascii_case("occupancy") {
            Metric::Occupancy
        } else {
            Metric::Entrances
        }
    }

    /// Wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Occupancy => "occupancy",
            Metric::Entrances => "entrances",
        }
    }
}

impl From<String> for Metric {
    fn from(label: String) -> Self {
        Metric::from_label(&label)
    }
}

impl From<Metric> for String {
    fn from(metric: Metric) -> Self {
        metric.as_str().to_string()
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How buckets sharing a cell are combined, and how columns are keyed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Aggregation {
    /// One column per calendar date, one bucket per cell
    #[default]
    None,
    /// One column per weekday, cells summed
    Sum,
    /// One column per weekday, cells averaged and rounded
    Average,
}

impl Aggregation {
    /// Parse an aggregation label, case-insensitively
    ///
    /// An empty label means no aggregation.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Some(Aggregation::None),
            "sum" => Some(Aggregation::Sum),
            "average" | "avg" => Some(Aggregation::Average),
            _ => None,
        }
    }

    /// Wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::None => "none",
            Aggregation::Sum => "SUM",
            Aggregation::Average => "AVERAGE",
        }
    }

    /// Whether columns are weekdays (true) or calendar dates (false)
    pub fn groups_by_weekday(&self) -> bool {
        !matches!(self, Aggregation::None)
    }
}

impl TryFrom<String> for Aggregation {
    type Error = String;

    fn try_from(label: String) -> std::result::Result<Self, Self::Error> {
        Aggregation::parse(&label).ok_or_else(|| format!("unknown aggregation: {}", label))
    }
}

impl From<Aggregation> for String {
    fn from(aggregation: Aggregation) -> Self {
        aggregation.as_str().to_string()
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One report column: a date (or the latest date of a weekday) and its cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnData {
    /// Local midnight of the column's date, in the space's time zone
    pub date: DateTime<FixedOffset>,

    /// Cells indexed by row (hour offset from the column start)
    pub values: Vec<ReportCell>,
}

/// The hourly report table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Resolved start of the requested range
    pub start_date: DateTime<FixedOffset>,

    /// Resolved end of the requested range
    pub end_date: DateTime<FixedOffset>,

    /// Space metadata
    pub space: Space,

    /// Columns in first-seen order
    pub data: Vec<ColumnData>,

    /// Requested metric
    pub metric: Metric,

    /// Requested aggregation
    pub aggregation: Aggregation,
}
