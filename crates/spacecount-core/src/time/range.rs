use super::space_time::{local_midnight, parse_iso_time_in};
use crate::error::{CoreError, Result};
use chrono::{DateTime, Datelike, Days, NaiveDate, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// First day of the week, used by week-relative ranges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl WeekStart {
    fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Tuesday => Weekday::Tue,
            WeekStart::Wednesday => Weekday::Wed,
            WeekStart::Thursday => Weekday::Thu,
            WeekStart::Friday => Weekday::Fri,
            WeekStart::Saturday => Weekday::Sat,
        }
    }

    /// The most recent week start on or before `date`
    fn week_containing(self, date: NaiveDate) -> NaiveDate {
        let start = self.weekday().num_days_from_monday();
        let today = date.weekday().num_days_from_monday();
        let back = (7 + today - start) % 7;
        date - Days::new(u64::from(back))
    }
}

/// Ranges expressed relative to a reference timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelativeRange {
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "yesterday")]
    Yesterday,
    #[serde(rename = "last_7_days")]
    Last7Days,
    #[serde(rename = "last_28_days")]
    Last28Days,
    #[serde(rename = "week_to_date")]
    WeekToDate,
    #[serde(rename = "last_week")]
    LastWeek,
    #[serde(rename = "month_to_date")]
    MonthToDate,
}

/// A requested report range: either absolute timestamps or a relative range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRangeSpec {
    /// Absolute start (ISO-8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    /// Absolute end (ISO-8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,

    /// Relative range; takes precedence over `start`/`end`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative: Option<RelativeRange>,

    /// Keep Saturday and Sunday buckets
    #[serde(default = "default_true", alias = "includeWeekends")]
    pub include_weekends: bool,
}

impl TimeRangeSpec {
    /// Absolute range between two ISO-8601 timestamps
    pub fn absolute(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
            relative: None,
            include_weekends: true,
        }
    }

    /// Range relative to the report's reference timestamp
    pub fn relative(range: RelativeRange) -> Self {
        Self {
            start: None,
            end: None,
            relative: Some(range),
            include_weekends: true,
        }
    }

    /// Drop weekend buckets from the report
    pub fn excluding_weekends(mut self) -> Self {
        self.include_weekends = false;
        self
    }
}

/// A time range resolved to concrete local instants
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTimeRange {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    /// Whole local days between the start and the reference timestamp
    pub start_days_ago: i64,
    /// Whole local days between the end and the reference timestamp
    pub end_days_ago: i64,
}

/// Resolve a range request against `reference` (local time at the space).
///
/// Relative ranges snap to local midnights and are half-open: the end is
/// the first instant not included.
pub fn convert_time_range_to_days_ago(
    reference: &DateTime<Tz>,
    spec: &TimeRangeSpec,
    week_start: WeekStart,
) -> Result<ResolvedTimeRange> {
    let tz = reference.timezone();
    let today = reference.date_naive();

    let (start, end) = match (spec.relative, &spec.start, &spec.end) {
        (Some(relative), _, _) => {
            let (from, to) = relative_dates(relative, today, week_start)?;
            (local_midnight(from, &tz), local_midnight(to, &tz))
        }
        (None, Some(start), Some(end)) => (parse_iso_time_in(start, &tz)?, parse_iso_time_in(end, &tz)?),
        _ => {
            return Err(CoreError::InvalidTimeRange(
                "either a relative range or both start and end are required".to_string(),
            ))
        }
    };

    if start > end {
        return Err(CoreError::InvalidTimeRange(format!(
            "start {} is after end {}",
            start.to_rfc3339(),
            end.to_rfc3339()
        )));
    }

    Ok(ResolvedTimeRange {
        start_days_ago: (today - start.date_naive()).num_days(),
        end_days_ago: (today - end.date_naive()).num_days(),
        start,
        end,
    })
}

fn relative_dates(range: RelativeRange, today: NaiveDate, week_start: WeekStart) -> Result<(NaiveDate, NaiveDate)> {
    let days_back = |n: u64| {
        today
            .checked_sub_days(Days::new(n))
            .ok_or_else(|| CoreError::InvalidTimeRange(format!("{} days before {} is out of range", n, today)))
    };
    let tomorrow = today
        .checked_add_days(Days::new(1))
        .ok_or_else(|| CoreError::InvalidTimeRange(format!("day after {} is out of range", today)))?;

    Ok(match range {
        RelativeRange::Today => (today, tomorrow),
        RelativeRange::Yesterday => (days_back(1)?, today),
        RelativeRange::Last7Days => (days_back(7)?, today),
        RelativeRange::Last28Days => (days_back(28)?, today),
        RelativeRange::WeekToDate => (week_start.week_containing(today), tomorrow),
        RelativeRange::LastWeek => {
            let this_week = week_start.week_containing(today);
            (this_week - Days::new(7), this_week)
        }
        RelativeRange::MonthToDate => (today.with_day(1).unwrap_or(today), tomorrow),
    })
}

fn default_true() -> bool {
    true
}
