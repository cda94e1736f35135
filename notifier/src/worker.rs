use std::sync::Arc;

use scheduler::Alert;
use tokio::sync::mpsc::Receiver;
use tracing::{Instrument as _, error, info, info_span, warn};

use crate::message::compose;
use crate::sink::NotificationSink;

/// Delivers alerts one at a time until every sender is dropped.
///
/// A failed delivery is logged and dropped. The alert already counts as
/// fired: tally and debounce state are never rolled back.
pub async fn run_notifier<S: NotificationSink>(mut rx: Receiver<Alert>, sink: Arc<S>) {
    info!(component = "notifier", event = "startup", "notification worker started");

    while let Some(alert) = rx.recv().await {
        let span = info_span!(
            "alert_delivery",
            instrument = %alert.result.instrument,
            strategy = %alert.result.strategy_name,
            tally = alert.tally
        );

        let text = compose(&alert);
        if let Err(e) = sink.send(alert.target, &text).instrument(span).await {
            error!(error = %e, alert = ?alert, "alert delivery failed");
        }
    }

    warn!(component = "notifier", event = "shutdown", "alert channel closed");
}
