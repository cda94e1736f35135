//! Per-day signal counts, included in every alert.

use std::collections::HashMap;

use chrono::{Days, FixedOffset, NaiveDate};
use common::time::local_date;
use market::Instrument;
use parking_lot::Mutex;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TallyKey {
    pub instrument: Instrument,
    pub day: NaiveDate,
}

/// Counts forwarded signals per (instrument, calendar day in the operator's
/// time zone). Counts only grow; past days are removed by [`SignalTally::sweep`].
#[derive(Debug)]
pub struct SignalTally {
    offset: FixedOffset,
    counts: Mutex<HashMap<TallyKey, u32>>,
}

impl SignalTally {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            offset,
            counts: Mutex::new(HashMap::new()),
        }
    }

    fn key(&self, instrument: &Instrument, now_ms: u64) -> TallyKey {
        TallyKey {
            instrument: instrument.clone(),
            day: local_date(now_ms, self.offset),
        }
    }

    /// Increments and returns today's count for `instrument`.
    pub fn record_and_count(&self, instrument: &Instrument, now_ms: u64) -> u32 {
        let key = self.key(instrument, now_ms);
        let mut counts = self.counts.lock();
        let n = counts.entry(key).or_insert(0);
        *n = n.saturating_add(1);
        *n
    }

    pub fn count(&self, instrument: &Instrument, now_ms: u64) -> u32 {
        let key = self.key(instrument, now_ms);
        self.counts.lock().get(&key).copied().unwrap_or(0)
    }

    /// Drops entries for days more than `retained_days` before today.
    pub fn sweep(&self, now_ms: u64, retained_days: u32) -> usize {
        let today = local_date(now_ms, self.offset);
        let Some(oldest_kept) = today.checked_sub_days(Days::new(u64::from(retained_days))) else {
            return 0;
        };

        let mut counts = self.counts.lock();
        let before = counts.len();
        counts.retain(|k, _| k.day >= oldest_kept);
        let removed = before - counts.len();

        if removed > 0 {
            debug!(removed, remaining = counts.len(), "tally entries swept");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.counts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = 86_400_000;
    // 2024-03-15T10:00:00Z
    const T0: u64 = 1_710_496_800_000;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn counts_grow_within_a_day() {
        let tally = SignalTally::new(utc());
        let x = Instrument::new("X");

        assert_eq!(tally.record_and_count(&x, T0), 1);
        assert_eq!(tally.record_and_count(&x, T0 + 1_000), 2);
        assert_eq!(tally.record_and_count(&x, T0 + 2_000), 3);
        assert_eq!(tally.count(&x, T0), 3);
    }

    #[test]
    fn next_day_starts_fresh() {
        let tally = SignalTally::new(utc());
        let x = Instrument::new("X");

        tally.record_and_count(&x, T0);
        tally.record_and_count(&x, T0);

        assert_eq!(tally.record_and_count(&x, T0 + DAY), 1);
    }

    #[test]
    fn instruments_are_counted_separately() {
        let tally = SignalTally::new(utc());

        tally.record_and_count(&Instrument::new("X"), T0);
        assert_eq!(tally.record_and_count(&Instrument::new("Y"), T0), 1);
    }

    #[test]
    fn day_boundary_follows_operator_offset() {
        // 22:30 UTC is already the next day at UTC+3.
        let late = T0 + 12 * 3_600_000 + 30 * 60_000;
        let msk = SignalTally::new(FixedOffset::east_opt(3 * 3600).unwrap());
        let x = Instrument::new("X");

        msk.record_and_count(&x, T0);
        assert_eq!(msk.record_and_count(&x, late), 1);
    }

    #[test]
    fn sweep_drops_old_days_only() {
        let tally = SignalTally::new(utc());
        let x = Instrument::new("X");

        tally.record_and_count(&x, T0);
        tally.record_and_count(&x, T0 + DAY);
        tally.record_and_count(&x, T0 + 3 * DAY);

        let removed = tally.sweep(T0 + 3 * DAY, 1);

        assert_eq!(removed, 2);
        assert_eq!(tally.count(&x, T0 + 3 * DAY), 1);
    }
}
