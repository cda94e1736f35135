use std::time::{Duration, Instant};

use tracing::{Span, field};

use super::TraceId;

/// Root span for one scan pass. `instruments` and `fired` are recorded once known.
pub fn pass_span(trace_id: &TraceId, tick_ms: u64) -> Span {
    tracing::info_span!(
        "scan_pass",
        trace_id = %trace_id,
        tick_ms,
        instruments = field::Empty,
        fired = field::Empty
    )
}

/// Awaits `fut` and emits a warning under the `performance` target when it
/// took longer than `max`.
pub async fn warn_if_slow<F, T>(label: &'static str, max: Duration, fut: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let start = Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed();
    if elapsed > max {
        tracing::warn!(
            target: "performance",
            label = label,
            elapsed_ms = elapsed.as_millis() as u64,
            "slow operation detected"
        );
    }
    out
}
