//! The scan engine.
//!
//! One pass:
//!   1. Snapshots the runtime settings (no-op when disabled or untargeted).
//!   2. Fetches the instrument universe and, in one batched call, current prices.
//!   3. Per instrument: records the sample, then evaluates every strategy
//!      against the updated history.
//!   4. Filters results through the debounce gate, tallies survivors and
//!      hands them to the notification queue.
//!
//! The engine does not know about timers or overlap; [`crate::ScanScheduler`]
//! guarantees that at most one pass runs at a time.

use std::sync::Arc;

use anyhow::Context;
use common::logger::warn_if_slow;
use market::pulse::{self, DetectionResult, StrategyConfig};
use market::{Instrument, InstrumentUniverseProvider, PriceHistoryStore, PriceSample, PriceSource};
use parking_lot::Mutex;
use settings::{FirePolicy, SettingsStore};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

use crate::debounce::DebounceGate;
use crate::metrics::Counters;
use crate::tally::SignalTally;
use crate::types::{Alert, AlertSender, EngineConfig, PassOutcome, PassReport};

pub struct ScanEngine<U, P> {
    universe: Arc<U>,
    prices: Arc<P>,
    settings: SettingsStore,

    /// Only touched synchronously; never held across an await.
    history: Mutex<PriceHistoryStore>,

    debounce: DebounceGate,
    tally: SignalTally,
    alert_tx: AlertSender,
    cfg: EngineConfig,

    /// Observability counters (does not affect behavior).
    counters: Counters,
}

/// Items removed by one maintenance sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub histories: usize,
    pub debounce: usize,
    pub tally: usize,
}

impl<U, P> ScanEngine<U, P>
where
    U: InstrumentUniverseProvider,
    P: PriceSource,
{
    pub fn new(
        universe: Arc<U>,
        prices: Arc<P>,
        settings: SettingsStore,
        alert_tx: AlertSender,
        cfg: EngineConfig,
        counters: Counters,
    ) -> Self {
        let retention_ms = settings.snapshot().max_lookback_ms() + cfg.retention_slack_ms;

        Self {
            universe,
            prices,
            settings,
            history: Mutex::new(PriceHistoryStore::new(retention_ms)),
            debounce: DebounceGate::new(),
            tally: SignalTally::new(cfg.utc_offset),
            alert_tx,
            cfg,
            counters,
        }
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn tally(&self) -> &SignalTally {
        &self.tally
    }

    pub fn debounce(&self) -> &DebounceGate {
        &self.debounce
    }

    /// Runs `f` with shared access to the price histories.
    pub fn with_history<R>(&self, f: impl FnOnce(&PriceHistoryStore) -> R) -> R {
        f(&self.history.lock())
    }

    /// Executes one scan pass stamped at `tick_ms`.
    ///
    /// Upstream failures for the universe or the price batch fail the pass;
    /// a missing price for a single instrument only skips that instrument.
    pub async fn run_pass(&self, tick_ms: u64) -> anyhow::Result<PassOutcome> {
        let settings = self.settings.snapshot();

        let Some(target) = settings.target.filter(|_| settings.is_active()) else {
            Counters::bump(&self.counters.passes_idle);
            debug!(
                enabled = settings.enabled,
                has_target = settings.target.is_some(),
                "scanner inactive; pass skipped"
            );
            return Ok(PassOutcome::Idle);
        };

        Counters::bump(&self.counters.passes);

        // Strategies may have changed since the last pass.
        self.history
            .lock()
            .set_retention_ms(settings.max_lookback_ms() + self.cfg.retention_slack_ms);

        let instruments = warn_if_slow(
            "universe",
            self.cfg.upstream_budget,
            self.universe.current_instruments(settings.universe_filter),
        )
        .await
        .context("fetch instrument universe")?;

        let prices = warn_if_slow(
            "prices",
            self.cfg.upstream_budget,
            self.prices.current_prices(&instruments),
        )
        .await
        .context("fetch current prices")?;

        let mut report = PassReport {
            instruments: instruments.len(),
            ..Default::default()
        };

        for instrument in &instruments {
            let Some(&price) = prices.get(instrument) else {
                report.missing += 1;
                Counters::bump(&self.counters.prices_missing);
                debug!(instrument = %instrument, "no price this pass; instrument skipped");
                continue;
            };
            report.priced += 1;

            let sample = PriceSample::new(tick_ms, price);
            let results = self.record_and_evaluate(instrument, sample, &settings.strategies);

            for result in results {
                if self.admit_and_dispatch(result, target, settings.fire_policy, tick_ms) {
                    report.fired += 1;
                } else {
                    report.suppressed += 1;
                }
            }
        }

        if report.missing > 0 {
            warn!(
                missing = report.missing,
                priced = report.priced,
                "instruments without a price this pass"
            );
        }

        Ok(PassOutcome::Completed(report))
    }

    /// Appends the sample and evaluates strategies under one lock, so the
    /// detector always sees the just-recorded sample as "current".
    fn record_and_evaluate(
        &self,
        instrument: &Instrument,
        sample: PriceSample,
        strategies: &[StrategyConfig],
    ) -> Vec<DetectionResult> {
        let mut history = self.history.lock();

        if !history.record(instrument, sample) {
            return Vec::new();
        }

        history
            .history(instrument)
            .map(|h| pulse::evaluate(instrument, h, strategies))
            .unwrap_or_default()
    }

    /// Returns `true` when the result passed the debounce gate.
    fn admit_and_dispatch(
        &self,
        result: DetectionResult,
        target: settings::ChatId,
        policy: FirePolicy,
        now_ms: u64,
    ) -> bool {
        if !self.debounce.admit(&result, now_ms) {
            Counters::bump(&self.counters.signals_suppressed);
            debug!(
                instrument = %result.instrument,
                strategy = %result.strategy_name,
                "signal suppressed by cooldown"
            );
            return false;
        }

        if policy == FirePolicy::ClearHistory {
            self.history.lock().clear(&result.instrument);
        }

        let tally = self.tally.record_and_count(&result.instrument, now_ms);
        Counters::bump(&self.counters.signals_fired);

        info!(
            instrument = %result.instrument,
            strategy = %result.strategy_name,
            direction = %result.direction,
            percent_change = result.percent_change,
            lookback_minutes = result.lookback_minutes,
            tally,
            "signal fired"
        );

        self.dispatch(Alert {
            result,
            target,
            tally,
            ts_ms: now_ms,
        });
        true
    }

    /// Hands the alert to the notification queue without waiting on delivery.
    fn dispatch(&self, alert: Alert) {
        match self.alert_tx.try_send(alert) {
            Ok(()) => {}
            Err(TrySendError::Full(alert)) => {
                Counters::bump(&self.counters.alerts_dropped);
                warn!(alert = ?alert, "alert queue full; alert dropped");
            }
            Err(TrySendError::Closed(alert)) => {
                Counters::bump(&self.counters.alerts_dropped);
                warn!(alert = ?alert, "alert queue closed; alert dropped");
            }
        }
    }

    /// Ages out state that can no longer influence a pass.
    pub fn sweep(&self, now_ms: u64, tally_retained_days: u32) -> SweepReport {
        let max_cooldown_ms = self.settings.snapshot().max_cooldown_ms();

        SweepReport {
            histories: self.history.lock().sweep(now_ms),
            debounce: self.debounce.sweep(now_ms, max_cooldown_ms),
            tally: self.tally.sweep(now_ms, tally_retained_days),
        }
    }
}
