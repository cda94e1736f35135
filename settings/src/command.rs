//! Operator command grammar.
//!
//! ```text
//! /start [chat_id]
//! /on | /off | /status
//! /set <strategy> period <minutes>
//! /set <strategy> percent <value>
//! /set <strategy> cooldown <minutes>
//! /filter all|exclude
//! /policy cooldown|clear
//! ```
//!
//! Parsing is total: every input either yields a [`Command`] or a
//! [`SettingsError`], and numeric values are validated here, before any
//! state is touched.

use market::universe::UniverseFilter;

use crate::errors::SettingsError;
use crate::model::{ChatId, FirePolicy};

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyUpdate {
    Period(u32),
    Percent(f64),
    Cooldown(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start { target: Option<ChatId> },
    Enable,
    Disable,
    Status,
    Set { strategy: String, update: StrategyUpdate },
    Filter(UniverseFilter),
    Policy(FirePolicy),
}

const SET_USAGE: &str = "/set <strategy> period|percent|cooldown <value>";

impl Command {
    pub fn parse(text: &str) -> Result<Self, SettingsError> {
        let mut parts = text.split_whitespace();
        let head = parts.next().ok_or(SettingsError::Empty)?;
        let name = head.trim_start_matches('/').to_ascii_lowercase();
        let args: Vec<&str> = parts.collect();

        match name.as_str() {
            "start" => {
                let target = match args.first() {
                    Some(raw) => Some(
                        raw.parse::<ChatId>()
                            .map_err(|_| SettingsError::InvalidTarget((*raw).to_string()))?,
                    ),
                    None => None,
                };
                Ok(Command::Start { target })
            }
            "on" => Ok(Command::Enable),
            "off" => Ok(Command::Disable),
            "status" => Ok(Command::Status),
            "set" => parse_set(&args),
            "filter" => {
                let raw = args.first().ok_or(SettingsError::Usage("/filter all|exclude"))?;
                raw.parse::<UniverseFilter>()
                    .map(Command::Filter)
                    .map_err(SettingsError::UnknownFilter)
            }
            "policy" => {
                let raw = args
                    .first()
                    .ok_or(SettingsError::Usage("/policy cooldown|clear"))?;
                raw.parse::<FirePolicy>()
                    .map(Command::Policy)
                    .map_err(SettingsError::UnknownPolicy)
            }
            _ => Err(SettingsError::UnknownCommand(head.to_string())),
        }
    }
}

fn parse_set(args: &[&str]) -> Result<Command, SettingsError> {
    let [strategy, field, raw] = args else {
        return Err(SettingsError::Usage(SET_USAGE));
    };

    let update = match field.to_ascii_lowercase().as_str() {
        "period" => StrategyUpdate::Period(parse_minutes("period", raw)?),
        "percent" => StrategyUpdate::Percent(parse_number("percent", raw)?),
        "cooldown" => StrategyUpdate::Cooldown(parse_minutes("cooldown", raw)?),
        other => return Err(SettingsError::UnknownField(other.to_string())),
    };

    Ok(Command::Set {
        strategy: strategy.to_ascii_lowercase(),
        update,
    })
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, SettingsError> {
    raw.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SettingsError::NotANumber {
            field,
            raw: raw.to_string(),
        })
}

/// Minutes are typed as numbers and truncated to whole minutes.
/// Negative input cannot be represented and is rejected here; zero is left
/// for strategy validation to reject.
fn parse_minutes(field: &'static str, raw: &str) -> Result<u32, SettingsError> {
    let value = parse_number(field, raw)?;
    if value < 0.0 || value > f64::from(u32::MAX) {
        return Err(SettingsError::NotANumber {
            field,
            raw: raw.to_string(),
        });
    }
    Ok(value.trunc() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_toggles_and_status() {
        assert_eq!(Command::parse("/on"), Ok(Command::Enable));
        assert_eq!(Command::parse("off"), Ok(Command::Disable));
        assert_eq!(Command::parse("  /STATUS "), Ok(Command::Status));
    }

    #[test]
    fn parses_start_with_and_without_target() {
        assert_eq!(
            Command::parse("/start"),
            Ok(Command::Start { target: None })
        );
        assert_eq!(
            Command::parse("/start -100123"),
            Ok(Command::Start {
                target: Some(-100123)
            })
        );
        assert!(matches!(
            Command::parse("/start me"),
            Err(SettingsError::InvalidTarget(_))
        ));
    }

    #[test]
    fn parses_strategy_updates() {
        assert_eq!(
            Command::parse("/set long period 5"),
            Ok(Command::Set {
                strategy: "long".into(),
                update: StrategyUpdate::Period(5)
            })
        );
        assert_eq!(
            Command::parse("/set Short percent 2,5"),
            Ok(Command::Set {
                strategy: "short".into(),
                update: StrategyUpdate::Percent(2.5)
            })
        );
        assert_eq!(
            Command::parse("/set dump period 7.9"),
            Ok(Command::Set {
                strategy: "dump".into(),
                update: StrategyUpdate::Period(7)
            })
        );
    }

    #[test]
    fn rejects_non_numeric_values() {
        assert_eq!(
            Command::parse("/set long percent abc"),
            Err(SettingsError::NotANumber {
                field: "percent",
                raw: "abc".into()
            })
        );
        assert!(matches!(
            Command::parse("/set long period -3"),
            Err(SettingsError::NotANumber { field: "period", .. })
        ));
        assert!(matches!(
            Command::parse("/set long percent inf"),
            Err(SettingsError::NotANumber { .. })
        ));
    }

    #[test]
    fn rejects_malformed_commands() {
        assert_eq!(Command::parse("   "), Err(SettingsError::Empty));
        assert_eq!(
            Command::parse("/set long period"),
            Err(SettingsError::Usage(SET_USAGE))
        );
        assert_eq!(
            Command::parse("/set long speed 3"),
            Err(SettingsError::UnknownField("speed".into()))
        );
        assert!(matches!(
            Command::parse("/launch"),
            Err(SettingsError::UnknownCommand(_))
        ));
        assert!(matches!(
            Command::parse("/filter top10"),
            Err(SettingsError::UnknownFilter(_))
        ));
    }

    #[test]
    fn parses_filter_and_policy() {
        assert_eq!(
            Command::parse("/filter exclude"),
            Ok(Command::Filter(UniverseFilter::ExcludeMajors))
        );
        assert_eq!(
            Command::parse("/policy clear"),
            Ok(Command::Policy(FirePolicy::ClearHistory))
        );
    }
}
