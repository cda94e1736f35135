//! Shared types used by the scheduler subsystem.

use std::fmt;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use market::pulse::DetectionResult;
use settings::ChatId;
use tokio::sync::mpsc::Sender;

/// An admitted signal on its way to the notification layer.
#[derive(Clone)]
pub struct Alert {
    pub result: DetectionResult,
    pub target: ChatId,

    /// Signals fired today for this instrument, this one included.
    pub tally: u32,

    pub ts_ms: u64,
}

impl fmt::Debug for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alert")
            .field("instrument", &self.result.instrument)
            .field("strategy", &self.result.strategy_name)
            .field("percent_change", &self.result.percent_change)
            .field("tally", &self.tally)
            .field("target", &self.target)
            .finish()
    }
}

/// The notification worker receives alerts from the engine through this queue.
pub type AlertSender = Sender<Alert>;

/// Static engine parameters, fixed at process start.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Operator time zone, used for the tally's calendar day.
    pub utc_offset: FixedOffset,

    /// Added on top of the longest lookback when sizing history retention.
    pub retention_slack_ms: u64,

    /// Upstream calls slower than this are logged as slow.
    pub upstream_budget: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            utc_offset: Utc.fix(),
            retention_slack_ms: 60_000,
            upstream_budget: Duration::from_secs(5),
        }
    }
}

/// What one pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub instruments: usize,
    pub priced: usize,
    pub missing: usize,
    pub fired: usize,
    pub suppressed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// Scanning disabled or no notification target; nothing was fetched.
    Idle,
    Completed(PassReport),
}
