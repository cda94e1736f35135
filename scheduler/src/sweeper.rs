use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use common::time::now_ms;
use market::{InstrumentUniverseProvider, PriceSource};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::engine::ScanEngine;

/// Periodically ages out histories of delisted instruments, expired
/// debounce entries and tally days outside the retention horizon.
pub async fn run_sweeper<U, P, F>(
    engine: Arc<ScanEngine<U, P>>,
    every: Duration,
    tally_retained_days: u32,
    shutdown: F,
) where
    U: InstrumentUniverseProvider,
    P: PriceSource,
    F: Future<Output = ()>,
{
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    // The first tick completes immediately; nothing to sweep at startup.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                let report = engine.sweep(now_ms(), tally_retained_days);
                if report == Default::default() {
                    debug!("sweep found nothing to remove");
                } else {
                    info!(
                        histories = report.histories,
                        debounce = report.debounce,
                        tally = report.tally,
                        "state swept"
                    );
                }
            }
        }
    }
}
