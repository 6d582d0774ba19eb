//! Column and row assignment

use chrono::{DateTime, NaiveDate, SecondsFormat, Timelike};
use chrono_tz::Tz;
use spacecount_core::time::local_midnight;
use spacecount_core::{Aggregation, Bucket};
use std::collections::HashMap;
use tracing::warn;

/// Buckets assigned to one report column
#[derive(Debug, Clone, PartialEq)]
pub struct BucketColumn {
    /// Local calendar date (`YYYY-MM-DD`) or local weekday name
    pub column_key: String,

    /// Local date of the latest bucket seen for this column
    pub date: NaiveDate,

    /// Local time of the column's first bucket; rows are counted from here
    pub first_local: DateTime<Tz>,

    /// One cell per row. `None` is a row no bucket landed in.
    pub bucket_arrays: Vec<Option<Vec<Bucket>>>,
}

impl BucketColumn {
    fn new(column_key: String, local: DateTime<Tz>, bucket: Bucket) -> Self {
        Self {
            column_key,
            date: local.date_naive(),
            first_local: local,
            bucket_arrays: vec![Some(vec![bucket])],
        }
    }

    fn insert(&mut self, row: usize, bucket: Bucket) {
        if self.bucket_arrays.len() <= row {
            self.bucket_arrays.resize(row + 1, None);
        }
        match &mut self.bucket_arrays[row] {
            Some(cell) => cell.push(bucket),
            slot @ None => *slot = Some(vec![bucket]),
        }
    }
}

fn minutes_of_day(local: &DateTime<Tz>) -> i64 {
    i64::from(local.hour()) * 60 + i64::from(local.minute())
}

fn column_key(local: &DateTime<Tz>, aggregation: Aggregation) -> String {
    if aggregation.groups_by_weekday() {
        local.format("%A").to_string()
    } else {
        local.format("%Y-%m-%d").to_string()
    }
}

/// Group localized buckets into columns, in the order given.
///
/// Callers pass buckets sorted by instant. Columns are created in first-seen
/// order and never re-sorted. A column's `date` is overwritten by every
/// bucket it receives, so a weekday column ends up dated with the latest
/// occurrence of that weekday.
///
/// The row of a bucket is the whole number of hours between its local
/// wall-clock time and that of the column's first bucket. A bucket whose
/// time of day falls before the column's first bucket has no row and is
/// dropped.
pub fn group_buckets(buckets: Vec<(DateTime<Tz>, Bucket)>, aggregation: Aggregation) -> Vec<BucketColumn> {
    let mut columns: Vec<BucketColumn> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (local, bucket) in buckets {
        let key = column_key(&local, aggregation);

        let Some(position) = index.get(&key).copied() else {
            index.insert(key.clone(), columns.len());
            columns.push(BucketColumn::new(key, local, bucket));
            continue;
        };

        let column = &mut columns[position];
        let offset_minutes = minutes_of_day(&local) - minutes_of_day(&column.first_local);
        // Truncates toward zero like a whole-hour difference
        let row = offset_minutes / 60;
        if row < 0 {
            warn!(
                "Dropping bucket {}: earlier in the day than column {} starts",
                bucket.timestamp, column.column_key
            );
            continue;
        }

        column.insert(row as usize, bucket);
        column.date = local.date_naive();
    }

    columns
}

/// Left-pad the first column so its row 0 is local midnight.
///
/// When the first bucket is `H` whole hours past the start of its day, `H`
/// placeholder buckets (midnight, midnight + 1h, ...) with empty analytics
/// are inserted ahead of it. Returns the number of rows added.
pub fn pad_first_column(columns: &mut [BucketColumn]) -> usize {
    let Some(first) = columns.first_mut() else {
        return 0;
    };

    let tz = first.first_local.timezone();
    let midnight = local_midnight(first.first_local.date_naive(), &tz);
    let hours = (first.first_local.clone() - midnight.clone()).num_hours();
    if hours <= 0 {
        return 0;
    }

    let padding = (0..hours).map(|h| {
        let at = midnight.clone() + chrono::Duration::hours(h);
        Some(vec![Bucket::empty_at(at.to_rfc3339_opts(SecondsFormat::Secs, false))])
    });
    first.bucket_arrays.splice(0..0, padding);
    first.first_local = midnight;

    hours as usize
}
