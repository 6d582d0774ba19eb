use crate::error::{CoreError, Result};
use crate::types::Space;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

/// Parse an ISO-8601 timestamp into the given time zone.
///
/// Timestamps with an offset (`Z`, `+02:00`) name an exact instant and are
/// converted. Timestamps without one are read as wall-clock time in `tz`;
/// a bare date means local midnight.
pub fn parse_iso_time_in(timestamp: &str, tz: &Tz) -> Result<DateTime<Tz>> {
    let trimmed = timestamp.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(tz));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return tz
                .from_local_datetime(&naive)
                .earliest()
                .ok_or_else(|| CoreError::InvalidTimestamp(format!("{} does not exist in {}", trimmed, tz)));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(local_midnight(date, tz));
    }

    Err(CoreError::InvalidTimestamp(timestamp.to_string()))
}

/// Parse an ISO-8601 timestamp as local time at `space`
pub fn parse_iso_time_at_space(timestamp: &str, space: &Space) -> Result<DateTime<Tz>> {
    parse_iso_time_in(timestamp, &space.tz()?)
}

/// Format an instant as an ISO-8601 string with the space's local offset
pub fn format_in_iso_time_at_space<T: TimeZone>(instant: &DateTime<T>, space: &Space) -> Result<String> {
    let tz = space.tz()?;
    Ok(instant
        .with_timezone(&tz)
        .to_rfc3339_opts(SecondsFormat::Secs, false))
}

/// The given instant (normally "now") as local time at `space`
pub fn current_local_time_at_space(space: &Space, now: DateTime<Utc>) -> Result<DateTime<Tz>> {
    Ok(now.with_timezone(&space.tz()?))
}

/// The first instant of `date` in `tz`.
///
/// A few zones skip midnight on DST transition days; the day then starts at
/// the first wall-clock hour that exists.
pub fn local_midnight(date: NaiveDate, tz: &Tz) -> DateTime<Tz> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    let mut candidate = midnight;
    for _ in 0..=24 {
        if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
            return dt;
        }
        candidate += Duration::hours(1);
    }
    // Unreachable for real tz data; fall back to the UTC reading of midnight
    tz.from_utc_datetime(&midnight)
}

/// Local midnight of the day `dt` falls on
pub fn start_of_local_day(dt: &DateTime<Tz>) -> DateTime<Tz> {
    local_midnight(dt.date_naive(), &dt.timezone())
}
