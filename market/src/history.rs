use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::types::{Instrument, PriceSample};

/// Time-ordered samples for a single instrument.
///
/// Samples are only ever appended at the tail and evicted from the head, so
/// the sequence stays sorted by `ts_ms` without re-sorting.
#[derive(Clone, Debug, Default)]
pub struct PriceHistory {
    samples: VecDeque<PriceSample>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `sample` and evicts everything older than `sample.ts_ms - retention_ms`.
    ///
    /// Returns `false` (and leaves the history untouched) when the sample is
    /// older than the current tail.
    pub fn push(&mut self, sample: PriceSample, retention_ms: u64) -> bool {
        if let Some(last) = self.samples.back() {
            if sample.ts_ms < last.ts_ms {
                return false;
            }
        }

        self.samples.push_back(sample);
        self.evict_old(sample.ts_ms, retention_ms);
        true
    }

    /// Evict samples older than the retention window ending at `now_ms`.
    fn evict_old(&mut self, now_ms: u64, retention_ms: u64) {
        let cutoff = now_ms.saturating_sub(retention_ms);
        while let Some(front) = self.samples.front() {
            if front.ts_ms < cutoff {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn latest(&self) -> Option<PriceSample> {
        self.samples.back().copied()
    }

    pub fn oldest(&self) -> Option<PriceSample> {
        self.samples.front().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceSample> {
        self.samples.iter()
    }

    /// Most recent sample with `ts_ms <= target_ms`.
    pub fn value_at_or_before(&self, target_ms: u64) -> Option<PriceSample> {
        self.samples
            .iter()
            .rev()
            .find(|s| s.ts_ms <= target_ms)
            .copied()
    }

    /// Earliest retained sample with `ts_ms >= target_ms`, scanning from the head.
    ///
    /// This is the lookback baseline: the oldest sample still inside the
    /// window, not the one closest to the window boundary.
    pub fn first_at_or_after(&self, target_ms: u64) -> Option<PriceSample> {
        self.samples.iter().find(|s| s.ts_ms >= target_ms).copied()
    }

    /// `(baseline_price, current_price)` for the window of `window_ms` ending at
    /// the newest sample. `None` while fewer than two samples fall inside it.
    pub fn earliest_and_latest_within(&self, window_ms: u64) -> Option<(f64, f64)> {
        let latest = self.latest()?;
        let baseline = self.first_at_or_after(latest.ts_ms.saturating_sub(window_ms))?;

        if baseline.ts_ms >= latest.ts_ms {
            return None;
        }

        Some((baseline.price, latest.price))
    }
}

/// Per-instrument price histories bounded by a shared retention window.
///
/// The retention window must cover the longest strategy lookback; callers
/// resize it through [`PriceHistoryStore::set_retention_ms`] when strategies change.
#[derive(Debug)]
pub struct PriceHistoryStore {
    retention_ms: u64,
    histories: HashMap<Instrument, PriceHistory>,
}

impl PriceHistoryStore {
    pub fn new(retention_ms: u64) -> Self {
        Self {
            retention_ms,
            histories: HashMap::new(),
        }
    }

    pub fn retention_ms(&self) -> u64 {
        self.retention_ms
    }

    pub fn set_retention_ms(&mut self, retention_ms: u64) {
        if retention_ms != self.retention_ms {
            debug!(
                old = self.retention_ms,
                new = retention_ms,
                "history retention resized"
            );
            self.retention_ms = retention_ms;
        }
    }

    /// Appends `sample` to the instrument's history (creating it if needed),
    /// then prunes samples older than the retention window.
    pub fn record(&mut self, instrument: &Instrument, sample: PriceSample) -> bool {
        let retention_ms = self.retention_ms;
        let accepted = self
            .histories
            .entry(instrument.clone())
            .or_default()
            .push(sample, retention_ms);

        if !accepted {
            debug!(
                instrument = %instrument,
                ts_ms = sample.ts_ms,
                "out-of-order sample ignored"
            );
        }
        accepted
    }

    pub fn history(&self, instrument: &Instrument) -> Option<&PriceHistory> {
        self.histories.get(instrument)
    }

    pub fn value_at_or_before(&self, instrument: &Instrument, target_ms: u64) -> Option<PriceSample> {
        self.histories.get(instrument)?.value_at_or_before(target_ms)
    }

    pub fn earliest_and_latest_within(
        &self,
        instrument: &Instrument,
        window_ms: u64,
    ) -> Option<(f64, f64)> {
        self.histories
            .get(instrument)?
            .earliest_and_latest_within(window_ms)
    }

    /// Drops every sample of `instrument`; the next sample starts a fresh baseline.
    pub fn clear(&mut self, instrument: &Instrument) {
        self.histories.remove(instrument);
    }

    /// Drops histories whose newest sample is already outside the retention
    /// window at `now_ms` (instruments that left the universe or stopped pricing).
    pub fn sweep(&mut self, now_ms: u64) -> usize {
        let cutoff = now_ms.saturating_sub(self.retention_ms);
        let before = self.histories.len();
        self.histories
            .retain(|_, h| h.latest().is_some_and(|s| s.ts_ms >= cutoff));
        before - self.histories.len()
    }

    pub fn len(&self) -> usize {
        self.histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }
}
