use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal counters for operational visibility.
#[derive(Clone, Default, Debug)]
pub struct Counters {
    pub passes: Arc<AtomicU64>,
    pub passes_idle: Arc<AtomicU64>,
    pub passes_failed: Arc<AtomicU64>,
    pub ticks_skipped: Arc<AtomicU64>,

    pub prices_missing: Arc<AtomicU64>,
    pub signals_fired: Arc<AtomicU64>,
    pub signals_suppressed: Arc<AtomicU64>,
    pub alerts_dropped: Arc<AtomicU64>,
}

impl Counters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}
