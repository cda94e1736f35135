use market::pulse::StrategyError;
use thiserror::Error;

/// Rejections at the configuration boundary. None of them mutate state.
#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("unknown field: {0} (expected period, percent or cooldown)")]
    UnknownField(String),

    #[error("{field} expects a number, got {raw:?}")]
    NotANumber { field: &'static str, raw: String },

    #[error("invalid notification target: {0}")]
    InvalidTarget(String),

    #[error("unknown filter mode: {0} (expected all or exclude)")]
    UnknownFilter(String),

    #[error("unknown fire policy: {0} (expected cooldown or clear)")]
    UnknownPolicy(String),

    #[error(transparent)]
    Strategy(#[from] StrategyError),
}
