//! Debounce gate: suppresses repeated alerts for the same instrument and
//! strategy while a move is still unfolding.

use std::collections::HashMap;

use market::Instrument;
use market::pulse::DetectionResult;
use parking_lot::Mutex;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DebounceKey {
    pub instrument: Instrument,
    pub strategy: String,
}

impl From<&DetectionResult> for DebounceKey {
    fn from(r: &DetectionResult) -> Self {
        Self {
            instrument: r.instrument.clone(),
            strategy: r.strategy_name.clone(),
        }
    }
}

/// `last_fired` per (instrument, strategy).
///
/// A result is admitted when the key has never fired, or when at least the
/// result's cooldown has elapsed since the last admitted one. Rejected
/// results are dropped, never queued.
#[derive(Debug, Default)]
pub struct DebounceGate {
    last_fired: Mutex<HashMap<DebounceKey, u64>>,
}

impl DebounceGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admit(&self, result: &DetectionResult, now_ms: u64) -> bool {
        let key = DebounceKey::from(result);
        let mut map = self.last_fired.lock();

        if let Some(&last) = map.get(&key) {
            if now_ms.saturating_sub(last) < result.cooldown_ms {
                return false;
            }
        }

        map.insert(key, now_ms);
        true
    }

    pub fn last_fired(&self, key: &DebounceKey) -> Option<u64> {
        self.last_fired.lock().get(key).copied()
    }

    /// Forgets entries older than `max_age_ms`; they can no longer block anything.
    pub fn sweep(&self, now_ms: u64, max_age_ms: u64) -> usize {
        let mut map = self.last_fired.lock();
        let before = map.len();
        map.retain(|_, last| now_ms.saturating_sub(*last) < max_age_ms);
        let removed = before - map.len();

        if removed > 0 {
            debug!(removed, remaining = map.len(), "debounce entries swept");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.last_fired.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
