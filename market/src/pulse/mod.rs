//! Threshold strategies and the detector that evaluates them against price history.
//!
//! Detection is side-effect free: it reads a history and
//! returns results. Debouncing, tallying and delivery happen downstream.

pub mod detector;
pub mod strategy;

pub use detector::{DetectionResult, evaluate, percent_change};
pub use strategy::{Direction, StrategyConfig, StrategyError, max_lookback_ms};
