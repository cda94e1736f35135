use std::fmt;

use common::time::minutes_to_ms;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which way the price has to move for a strategy to fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Rising,
    Falling,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Rising => f.write_str("rising"),
            Direction::Falling => f.write_str("falling"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum StrategyError {
    #[error("lookback must be at least one minute")]
    ZeroLookback,

    #[error("threshold must be a positive, finite percentage (got {0})")]
    InvalidThreshold(f64),

    #[error("cooldown must be at least one minute")]
    ZeroCooldown,
}

/// One named threshold rule, e.g. `long`: rising by 1% within 1 minute.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub name: String,
    pub direction: Direction,
    pub lookback_minutes: u32,
    pub threshold_percent: f64,

    /// Minimum quiet interval between two alerts of this strategy for the same
    /// instrument. Falls back to `lookback_minutes` when unset.
    pub cooldown_minutes: Option<u32>,
}

impl StrategyConfig {
    pub fn new(
        name: impl Into<String>,
        direction: Direction,
        lookback_minutes: u32,
        threshold_percent: f64,
    ) -> Self {
        Self {
            name: name.into(),
            direction,
            lookback_minutes,
            threshold_percent,
            cooldown_minutes: None,
        }
    }

    pub fn rising(name: impl Into<String>, lookback_minutes: u32, threshold_percent: f64) -> Self {
        Self::new(name, Direction::Rising, lookback_minutes, threshold_percent)
    }

    pub fn falling(name: impl Into<String>, lookback_minutes: u32, threshold_percent: f64) -> Self {
        Self::new(name, Direction::Falling, lookback_minutes, threshold_percent)
    }

    pub fn lookback_ms(&self) -> u64 {
        minutes_to_ms(self.lookback_minutes)
    }

    pub fn cooldown_ms(&self) -> u64 {
        minutes_to_ms(self.cooldown_minutes.unwrap_or(self.lookback_minutes))
    }

    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.lookback_minutes == 0 {
            return Err(StrategyError::ZeroLookback);
        }
        if !self.threshold_percent.is_finite() || self.threshold_percent <= 0.0 {
            return Err(StrategyError::InvalidThreshold(self.threshold_percent));
        }
        if self.cooldown_minutes == Some(0) {
            return Err(StrategyError::ZeroCooldown);
        }
        Ok(())
    }

    /// Direction test against a signed percent change.
    pub fn fires(&self, percent_change: f64) -> bool {
        match self.direction {
            Direction::Rising => percent_change >= self.threshold_percent,
            Direction::Falling => percent_change <= -self.threshold_percent,
        }
    }
}

/// Longest lookback across `strategies`, in ms. Sizes the history retention window.
pub fn max_lookback_ms(strategies: &[StrategyConfig]) -> u64 {
    strategies
        .iter()
        .map(StrategyConfig::lookback_ms)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_defaults_to_lookback() {
        let mut s = StrategyConfig::rising("long", 10, 2.0);
        assert_eq!(s.cooldown_ms(), 600_000);

        s.cooldown_minutes = Some(3);
        assert_eq!(s.cooldown_ms(), 180_000);
    }

    #[test]
    fn validation_rejects_degenerate_values() {
        assert_eq!(
            StrategyConfig::rising("a", 0, 1.0).validate(),
            Err(StrategyError::ZeroLookback)
        );
        assert!(matches!(
            StrategyConfig::rising("a", 1, 0.0).validate(),
            Err(StrategyError::InvalidThreshold(_))
        ));
        assert!(matches!(
            StrategyConfig::rising("a", 1, f64::NAN).validate(),
            Err(StrategyError::InvalidThreshold(_))
        ));
        assert!(StrategyConfig::falling("dump", 5, 5.0).validate().is_ok());
    }

    #[test]
    fn rising_fires_at_or_above_threshold() {
        let s = StrategyConfig::rising("long", 10, 2.0);
        assert!(s.fires(2.5));
        assert!(s.fires(2.0));
        assert!(!s.fires(1.9));
        assert!(!s.fires(-5.0));
    }

    #[test]
    fn falling_fires_at_or_below_negative_threshold() {
        let s = StrategyConfig::falling("dump", 30, 5.0);
        assert!(s.fires(-6.0));
        assert!(s.fires(-5.0));
        assert!(!s.fires(-4.0));
        assert!(!s.fires(6.0));
    }

    #[test]
    fn max_lookback_over_set() {
        let set = vec![
            StrategyConfig::rising("long", 1, 1.0),
            StrategyConfig::rising("short", 10, 30.0),
            StrategyConfig::falling("dump", 5, 5.0),
        ];
        assert_eq!(max_lookback_ms(&set), 600_000);
        assert_eq!(max_lookback_ms(&[]), 0);
    }
}
