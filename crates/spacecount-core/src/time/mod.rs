//! Space-local time helpers and time range resolution
//!
//! Every wall-clock computation in a report (weekday, calendar date,
//! hour-of-day) happens in the space's own time zone, never in UTC.

mod range;
mod space_time;

pub use range::{convert_time_range_to_days_ago, RelativeRange, ResolvedTimeRange, TimeRangeSpec, WeekStart};
pub use space_time::{
    current_local_time_at_space, format_in_iso_time_at_space, local_midnight, parse_iso_time_at_space,
    parse_iso_time_in, start_of_local_day,
};
