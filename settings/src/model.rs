use std::fmt;
use std::str::FromStr;

use market::pulse::{StrategyConfig, max_lookback_ms};
use market::universe::UniverseFilter;
use serde::{Deserialize, Serialize};

/// Telegram chat id of the operator channel.
pub type ChatId = i64;

/// What happens to an instrument's state when one of its signals is admitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirePolicy {
    /// Time-based debounce only; history is left intact.
    #[default]
    Cooldown,
    /// Debounce, then wipe the instrument's history so every strategy
    /// re-baselines from the next sample.
    ClearHistory,
}

impl fmt::Display for FirePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirePolicy::Cooldown => f.write_str("cooldown"),
            FirePolicy::ClearHistory => f.write_str("clear"),
        }
    }
}

impl FromStr for FirePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cooldown" => Ok(FirePolicy::Cooldown),
            "clear" | "clear_history" => Ok(FirePolicy::ClearHistory),
            other => Err(other.to_string()),
        }
    }
}

/// Process-wide runtime configuration.
///
/// Scan passes never read this directly: they take a cloned snapshot from
/// [`crate::SettingsStore`] once at pass start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub enabled: bool,
    pub target: Option<ChatId>,
    pub strategies: Vec<StrategyConfig>,
    pub universe_filter: UniverseFilter,
    pub fire_policy: FirePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: false,
            target: None,
            strategies: vec![
                StrategyConfig::rising("long", 1, 1.0),
                StrategyConfig::rising("short", 10, 30.0),
                StrategyConfig::falling("dump", 10, 10.0),
            ],
            universe_filter: UniverseFilter::All,
            fire_policy: FirePolicy::Cooldown,
        }
    }
}

impl Settings {
    /// A pass only does work when scanning is on and someone is listening.
    pub fn is_active(&self) -> bool {
        self.enabled && self.target.is_some()
    }

    pub fn strategy(&self, name: &str) -> Option<&StrategyConfig> {
        self.strategies
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn max_lookback_ms(&self) -> u64 {
        max_lookback_ms(&self.strategies)
    }

    /// Longest debounce interval across strategies.
    pub fn max_cooldown_ms(&self) -> u64 {
        self.strategies
            .iter()
            .map(|s| s.cooldown_ms())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market::pulse::Direction;

    #[test]
    fn defaults_start_disabled_with_three_strategies() {
        let s = Settings::default();

        assert!(!s.enabled);
        assert!(!s.is_active());
        assert_eq!(s.strategies.len(), 3);
        assert_eq!(s.strategy("DUMP").unwrap().direction, Direction::Falling);
        assert_eq!(s.max_lookback_ms(), 600_000);
    }

    #[test]
    fn active_requires_enabled_and_target() {
        let mut s = Settings::default();
        s.enabled = true;
        assert!(!s.is_active());

        s.target = Some(42);
        assert!(s.is_active());
    }

    #[test]
    fn fire_policy_parses() {
        assert_eq!("clear".parse::<FirePolicy>(), Ok(FirePolicy::ClearHistory));
        assert_eq!("Cooldown".parse::<FirePolicy>(), Ok(FirePolicy::Cooldown));
        assert!("never".parse::<FirePolicy>().is_err());
    }
}
