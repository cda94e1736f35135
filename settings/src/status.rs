use std::fmt::Write;

use market::pulse::Direction;

use crate::model::Settings;

/// Human-readable summary of the current configuration, sent in reply to
/// `/status` and after every accepted change.
pub fn render_status(settings: &Settings) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Pump screener");
    let _ = writeln!(out, "enabled: {}", if settings.enabled { "yes" } else { "no" });
    let _ = writeln!(
        out,
        "target: {}",
        settings
            .target
            .map(|t| t.to_string())
            .unwrap_or_else(|| "not set (send /start <chat_id>)".into())
    );
    let _ = writeln!(out, "universe: {}", settings.universe_filter);
    let _ = writeln!(out, "on fire: {}", settings.fire_policy);

    for s in &settings.strategies {
        let arrow = match s.direction {
            Direction::Rising => "up",
            Direction::Falling => "down",
        };
        let _ = write!(
            out,
            "\n{}: {} {}% within {} min",
            s.name.to_uppercase(),
            arrow,
            s.threshold_percent,
            s.lookback_minutes
        );
        if let Some(c) = s.cooldown_minutes {
            let _ = write!(out, " (cooldown {c} min)");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_lists_every_strategy() {
        let text = render_status(&Settings::default());

        assert!(text.contains("enabled: no"));
        assert!(text.contains("target: not set (send /start <chat_id>)"));
        assert!(text.contains("LONG: up 1% within 1 min"));
        assert!(text.contains("SHORT: up 30% within 10 min"));
        assert!(text.contains("DUMP: down 10% within 10 min"));
    }
}
