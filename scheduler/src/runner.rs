//! Periodic trigger for scan passes.
//!
//! Every tick attempts to start a pass. A tick that arrives while the previous
//! pass is still running is dropped, never queued: there is no catch-up burst
//! after a slow pass.
//!
//! Pass timestamps come from the interval's schedule, not from the wall clock
//! at the moment a tick is polled, so consecutive passes are stamped exactly
//! one interval apart.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use common::logger::{TraceId, pass_span};
use common::time::now_ms;
use market::{InstrumentUniverseProvider, PriceSource};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{Instrument as _, debug, error, info, warn};

use crate::engine::ScanEngine;
use crate::guard::SingleFlight;
use crate::metrics::Counters;
use crate::types::PassOutcome;

#[derive(Debug)]
pub enum TickOutcome {
    /// A pass was spawned; the handle resolves when it finishes.
    Started(JoinHandle<()>),
    /// The previous pass is still in flight.
    Skipped,
}

/// Maps scheduled tick instants onto wall-clock milliseconds.
///
/// Both clocks are read once; every later stamp is `start_ms` plus the
/// monotonic offset of the tick, so scheduling jitter never shifts a stamp.
#[derive(Debug, Clone, Copy)]
pub struct PassClock {
    start_ms: u64,
    start: Instant,
}

impl PassClock {
    pub fn new(start_ms: u64, start: Instant) -> Self {
        Self { start_ms, start }
    }

    pub fn now() -> Self {
        Self::new(now_ms(), Instant::now())
    }

    pub fn stamp(&self, tick: Instant) -> u64 {
        let offset = tick.saturating_duration_since(self.start);
        self.start_ms + offset.as_millis() as u64
    }
}

pub struct ScanScheduler<U, P> {
    engine: Arc<ScanEngine<U, P>>,
    guard: SingleFlight,
    interval: Duration,
}

impl<U, P> ScanScheduler<U, P>
where
    U: InstrumentUniverseProvider,
    P: PriceSource,
{
    pub fn new(engine: Arc<ScanEngine<U, P>>, interval: Duration) -> Self {
        Self {
            engine,
            guard: SingleFlight::new(),
            interval,
        }
    }

    pub fn engine(&self) -> &Arc<ScanEngine<U, P>> {
        &self.engine
    }

    pub fn is_running(&self) -> bool {
        self.guard.is_running()
    }

    fn interval_ms(&self) -> u64 {
        (self.interval.as_millis() as u64).max(1)
    }

    /// Starts a pass stamped at `tick_ms` unless one is already running.
    pub fn tick(&self, tick_ms: u64) -> TickOutcome {
        let Some(pass_guard) = self.guard.try_begin() else {
            Counters::bump(&self.engine.counters().ticks_skipped);
            warn!("previous scan pass still running; tick skipped");
            return TickOutcome::Skipped;
        };

        let engine = Arc::clone(&self.engine);
        let span = pass_span(&TraceId::new(), tick_ms);
        let task_span = span.clone();

        let handle = tokio::spawn(
            async move {
                // Held for the whole pass; dropped on every exit path.
                let _pass_guard = pass_guard;

                match engine.run_pass(tick_ms).await {
                    Ok(PassOutcome::Idle) => {}
                    Ok(PassOutcome::Completed(report)) => {
                        task_span.record("instruments", report.instruments);
                        task_span.record("fired", report.fired);
                        info!(
                            priced = report.priced,
                            missing = report.missing,
                            suppressed = report.suppressed,
                            "scan pass completed"
                        );
                    }
                    Err(e) => {
                        Counters::bump(&engine.counters().passes_failed);
                        error!(error = ?e, "scan pass failed");
                    }
                }
            }
            .instrument(span),
        );

        TickOutcome::Started(handle)
    }

    /// Drives ticks until `shutdown` resolves, then waits for the in-flight
    /// pass (if any) to finish.
    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let clock = PassClock::now();
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(every_ms = self.interval_ms(), "scan scheduler started");

        let mut in_flight: Option<JoinHandle<()>> = None;

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                scheduled = ticker.tick() => {
                    if let TickOutcome::Started(handle) = self.tick(clock.stamp(scheduled)) {
                        in_flight = Some(handle);
                    }
                }
            }
        }

        if let Some(handle) = in_flight {
            debug!("waiting for in-flight scan pass");
            if let Err(e) = handle.await {
                error!(error = ?e, "scan pass task aborted");
            }
        }

        info!("scan scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn stamps_follow_the_schedule_across_grid_boundaries() {
        // Wall clock one ms short of a minute boundary.
        let clock = PassClock::new(59_999, Instant::now());
        let mut ticker = interval(Duration::from_secs(60));

        let mut stamps = Vec::new();
        for _ in 0..3 {
            let scheduled = ticker.tick().await;
            stamps.push(clock.stamp(scheduled));
        }

        assert_eq!(stamps, vec![59_999, 119_999, 179_999]);
    }

    #[tokio::test(start_paused = true)]
    async fn late_polling_does_not_shift_the_stamp() {
        let clock = PassClock::new(1_000, Instant::now());
        let mut ticker = interval(Duration::from_secs(60));
        ticker.tick().await;

        // The loop gets to the tick well after its deadline.
        tokio::time::sleep(Duration::from_millis(60_250)).await;
        let scheduled = ticker.tick().await;

        assert_eq!(clock.stamp(scheduled), 61_000);
    }
}
