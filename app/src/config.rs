use std::collections::HashSet;
use std::time::Duration;

use anyhow::anyhow;
use chrono::FixedOffset;
use clap::Parser;
use market::Instrument;
use scheduler::EngineConfig;
use settings::{ChatId, Settings};

/// Large caps removed by the `exclude` universe filter unless overridden.
const DEFAULT_MAJORS: [&str; 8] = [
    "BTCUSDT", "ETHUSDT", "BNBUSDT", "SOLUSDT", "XRPUSDT", "DOGEUSDT", "ADAUSDT", "TRXUSDT",
];

/// Process configuration, fixed at start. Runtime settings live in
/// [`settings::SettingsStore`] and change through operator commands.
#[derive(Debug, Clone, Parser)]
#[clap(name = "pump-screener", version)]
pub struct AppConfig {
    /// Telegram bot token. Without it alerts are only written to the log.
    #[clap(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,

    /// Initial notification target (Telegram chat id).
    #[clap(long, env = "CHAT_ID", allow_hyphen_values = true)]
    pub chat_id: Option<ChatId>,

    #[clap(long, env = "BINANCE_URL", default_value = "https://fapi.binance.com")]
    pub binance_url: String,

    #[clap(long, env = "TELEGRAM_URL", default_value = "https://api.telegram.org")]
    pub telegram_url: String,

    /// Seconds between scan passes.
    #[clap(
        long,
        env = "SCAN_INTERVAL_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub scan_interval_secs: u64,

    /// How long an instrument listing is reused before it is fetched again.
    #[clap(
        long,
        env = "UNIVERSE_TTL_SECS",
        default_value_t = 3600,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub universe_ttl_secs: u64,

    /// Symbols dropped by the `exclude` universe filter (comma-separated).
    #[clap(
        long,
        env = "EXCLUDED_SYMBOLS",
        value_delimiter = ',',
        default_values = DEFAULT_MAJORS
    )]
    pub excluded_symbols: Vec<String>,

    /// Operator time zone as minutes east of UTC; decides where a tally day starts.
    #[clap(
        long,
        env = "UTC_OFFSET_MINUTES",
        default_value_t = 0,
        allow_hyphen_values = true
    )]
    pub utc_offset_minutes: i32,

    #[clap(long, env = "TALLY_RETAINED_DAYS", default_value_t = 3)]
    pub tally_retained_days: u32,

    #[clap(
        long,
        env = "SWEEP_INTERVAL_SECS",
        default_value_t = 600,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub sweep_interval_secs: u64,

    /// Alerts waiting for delivery beyond this are dropped.
    #[clap(long, env = "ALERT_QUEUE_CAPACITY", default_value_t = 256)]
    pub alert_queue_capacity: usize,

    /// Start with scanning enabled.
    #[clap(long, env = "ENABLE")]
    pub enable: bool,

    #[clap(long, env = "JSON_LOGS")]
    pub json_logs: bool,
}

impl AppConfig {
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    pub fn universe_ttl(&self) -> Duration {
        Duration::from_secs(self.universe_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn exclusions(&self) -> HashSet<Instrument> {
        self.excluded_symbols
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| Instrument::new(s.to_ascii_uppercase()))
            .collect()
    }

    pub fn initial_settings(&self) -> Settings {
        Settings {
            enabled: self.enable,
            target: self.chat_id,
            ..Default::default()
        }
    }

    pub fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let utc_offset = self
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| anyhow!("utc offset out of range: {} min", self.utc_offset_minutes))?;

        Ok(EngineConfig {
            utc_offset,
            // One interval of slack keeps the baseline sample of the longest window.
            retention_slack_ms: self.scan_interval_secs * 1_000,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> AppConfig {
        let argv = std::iter::once("pump-screener").chain(args.iter().copied());
        AppConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let cfg = parse(&[]);

        assert_eq!(cfg.scan_interval(), Duration::from_secs(60));
        assert_eq!(cfg.universe_ttl(), Duration::from_secs(3600));
        assert_eq!(cfg.tally_retained_days, 3);
        assert_eq!(cfg.alert_queue_capacity, 256);
        assert!(cfg.exclusions().contains(&Instrument::new("BTCUSDT")));
        assert!(!cfg.initial_settings().enabled);
    }

    #[test]
    fn flags_seed_initial_settings() {
        let cfg = parse(&["--enable", "--chat-id", "-1001", "--excluded-symbols", "pepeusdt, wifusdt"]);
        let s = cfg.initial_settings();

        assert!(s.is_active());
        assert_eq!(s.target, Some(-1001));

        let ex = cfg.exclusions();
        assert_eq!(ex.len(), 2);
        assert!(ex.contains(&Instrument::new("WIFUSDT")));
    }

    #[test]
    fn engine_config_uses_offset_and_interval() {
        let cfg = parse(&["--utc-offset-minutes", "180", "--scan-interval-secs", "30"]);
        let engine = cfg.engine_config().unwrap();

        assert_eq!(engine.utc_offset.local_minus_utc(), 3 * 3600);
        assert_eq!(engine.retention_slack_ms, 30_000);
    }

    #[test]
    fn rejects_zero_interval_and_bad_offset() {
        let argv = ["pump-screener", "--scan-interval-secs", "0"];
        assert!(AppConfig::try_parse_from(argv).is_err());

        let cfg = parse(&["--utc-offset-minutes", "100000"]);
        assert!(cfg.engine_config().is_err());
    }
}
