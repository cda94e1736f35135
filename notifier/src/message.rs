use market::pulse::Direction;
use scheduler::Alert;

const CHART_BASE: &str = "https://www.coinglass.com/tv/Binance_";

fn marker(direction: Direction) -> &'static str {
    match direction {
        Direction::Rising => "🟢",
        Direction::Falling => "🔴",
    }
}

/// Renders an alert as Telegram HTML.
///
/// ```text
/// 🟢 LONG signal
/// 🪙 PEPEUSDT            (linked to its chart)
/// 📈 Change: +3.00%
/// ⏱ Within 2 min
/// 🔁 Signals today: 1
/// ```
pub fn compose(alert: &Alert) -> String {
    let r = &alert.result;
    let symbol = r.instrument.as_str();
    let trend = match r.direction {
        Direction::Rising => "📈",
        Direction::Falling => "📉",
    };

    format!(
        "{} <b>{} signal</b>\n\
         🪙 <b><a href='{CHART_BASE}{symbol}'>{symbol}</a></b>\n\
         {trend} Change: {:+.2}%\n\
         ⏱ Within {} min\n\
         🔁 Signals today: {}",
        marker(r.direction),
        r.strategy_name.to_uppercase(),
        r.signed_change(),
        r.lookback_minutes,
        alert.tally,
    )
}
