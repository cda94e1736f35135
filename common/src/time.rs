//! Wall-clock helpers. All engine timestamps are milliseconds since the Unix epoch.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

pub const MS_PER_MINUTE: u64 = 60_000;

/// Current wall-clock time in ms since epoch.
pub fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

pub fn minutes_to_ms(minutes: u32) -> u64 {
    u64::from(minutes) * MS_PER_MINUTE
}

/// Calendar date of `ts_ms` as seen from a fixed UTC offset.
pub fn local_date(ts_ms: u64, offset: FixedOffset) -> NaiveDate {
    let utc = DateTime::<Utc>::from_timestamp_millis(ts_ms as i64).unwrap_or_default();
    utc.with_timezone(&offset).date_naive()
}
