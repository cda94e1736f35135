mod config;
mod console;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use common::logger::init_tracing;
use market::CachedUniverse;
use market::binance::BinanceClient;
use notifier::{LogSink, TelegramSink, run_notifier};
use scheduler::metrics::Counters;
use scheduler::{Alert, ScanEngine, ScanScheduler, run_sweeper};
use settings::SettingsStore;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tracing::{error, info, warn};

use crate::config::AppConfig;

type Universe = CachedUniverse<BinanceClient>;

/// Resolves once shutdown has been requested.
fn shutdown_signal(mut rx: watch::Receiver<bool>) -> impl Future<Output = ()> + Send + 'static {
    async move {
        let _ = rx.wait_for(|stop| *stop).await;
    }
}

/// Keeps the instrument listing warm independently of the scan cadence.
fn start_universe_refresher(
    universe: Arc<Universe>,
    every: Duration,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    if let Err(e) = universe.refresh().await {
                        warn!(error = %e, "scheduled universe refresh failed");
                    }
                }
            }
        }
    })
}

fn start_notifier(cfg: &AppConfig, rx: mpsc::Receiver<Alert>) -> anyhow::Result<JoinHandle<()>> {
    let handle = match &cfg.bot_token {
        Some(token) => {
            let sink = TelegramSink::new(&cfg.telegram_url, token).context("build telegram sink")?;
            tokio::spawn(run_notifier(rx, Arc::new(sink)))
        }
        None => {
            warn!("no bot token configured; alerts are written to the log only");
            tokio::spawn(run_notifier(rx, Arc::new(LogSink)))
        }
    };
    Ok(handle)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::parse();
    init_tracing("pump-screener", cfg.json_logs);

    info!(
        binance = %cfg.binance_url,
        scan_interval_secs = cfg.scan_interval_secs,
        enabled = cfg.enable,
        "Starting pump screener..."
    );

    let engine_cfg = cfg.engine_config()?;

    let binance = Arc::new(BinanceClient::new(cfg.binance_url.clone()).context("build binance client")?);
    let universe = Arc::new(CachedUniverse::new(
        Arc::clone(&binance),
        cfg.universe_ttl(),
        cfg.exclusions(),
    ));

    let settings = SettingsStore::new(cfg.initial_settings());
    let counters = Counters::default();

    let (alert_tx, alert_rx) = mpsc::channel(cfg.alert_queue_capacity.max(1));
    let notifier = start_notifier(&cfg, alert_rx)?;

    let engine = Arc::new(ScanEngine::new(
        Arc::clone(&universe),
        binance,
        settings.clone(),
        alert_tx,
        engine_cfg,
        counters.clone(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let refresher = start_universe_refresher(
        universe,
        cfg.universe_ttl(),
        shutdown_signal(shutdown_rx.clone()),
    );

    let sweeper = tokio::spawn(run_sweeper(
        Arc::clone(&engine),
        cfg.sweep_interval(),
        cfg.tally_retained_days,
        shutdown_signal(shutdown_rx.clone()),
    ));

    let scheduler = tokio::spawn(
        ScanScheduler::new(Arc::clone(&engine), cfg.scan_interval())
            .run(shutdown_signal(shutdown_rx)),
    );

    // Not joined: a pending stdin read cannot be cancelled.
    tokio::spawn(console::run_console(settings));

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    let _ = shutdown_tx.send(true);

    for (name, task) in [("scheduler", scheduler), ("sweeper", sweeper), ("refresher", refresher)] {
        if let Err(e) = task.await {
            error!(task = name, error = ?e, "task ended abnormally");
        }
    }

    // Last sender goes away with the engine; the notifier drains and exits.
    drop(engine);
    if timeout(Duration::from_secs(5), notifier).await.is_err() {
        warn!("notifier did not drain in time");
    }

    info!(
        passes = Counters::get(&counters.passes),
        passes_failed = Counters::get(&counters.passes_failed),
        ticks_skipped = Counters::get(&counters.ticks_skipped),
        signals_fired = Counters::get(&counters.signals_fired),
        signals_suppressed = Counters::get(&counters.signals_suppressed),
        alerts_dropped = Counters::get(&counters.alerts_dropped),
        "Pump screener stopped"
    );

    Ok(())
}
