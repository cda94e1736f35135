//! Single-flight guard for scan passes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// At most one [`PassGuard`] exists at any time.
#[derive(Clone, Debug, Default)]
pub struct SingleFlight {
    running: Arc<AtomicBool>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims the slot. `None` when a pass is already running.
    pub fn try_begin(&self) -> Option<PassGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PassGuard {
                running: Arc::clone(&self.running),
            })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Releases the slot on drop, including early returns and panics.
#[derive(Debug)]
pub struct PassGuard {
    running: Arc<AtomicBool>,
}

impl Drop for PassGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}
