use crate::history::PriceHistory;
use crate::pulse::strategy::{Direction, StrategyConfig};
use crate::types::Instrument;

/// Signal Detector
///
/// Measures the **percentage price change over each strategy's lookback
/// window** and reports the strategies whose threshold was crossed.
///
/// ## Change definition
///
/// ```text
/// percent_change = (p_now - p_baseline) / p_baseline * 100
/// ```
///
/// `p_baseline` is the oldest retained sample inside the window and `p_now`
/// the newest sample.
///
/// ## Direction test
/// - `Rising`  fires when `percent_change >= threshold`
/// - `Falling` fires when `percent_change <= -threshold`
///
/// ## Warm-up
/// A strategy is silently skipped while fewer than two samples fall inside
/// its window, or when the baseline is zero. Neither is an error.
///
/// Strategies are evaluated independently: one instrument may produce several
/// results in the same pass.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionResult {
    pub instrument: Instrument,
    pub strategy_name: String,
    pub direction: Direction,

    /// Unsigned magnitude of the change, in percent.
    pub percent_change: f64,

    pub lookback_minutes: u32,

    /// Debounce interval for this strategy, carried so the gate needs no config lookup.
    pub cooldown_ms: u64,

    pub baseline_price: f64,
    pub current_price: f64,
}

impl DetectionResult {
    /// Change with the sign restored from `direction`.
    pub fn signed_change(&self) -> f64 {
        match self.direction {
            Direction::Rising => self.percent_change,
            Direction::Falling => -self.percent_change,
        }
    }
}

/// Signed percent change from `baseline` to `current`.
///
/// Returns `None` for a zero, negative or non-finite baseline.
pub fn percent_change(baseline: f64, current: f64) -> Option<f64> {
    if !baseline.is_finite() || baseline <= 0.0 {
        return None;
    }

    let pct = (current - baseline) / baseline * 100.0;
    pct.is_finite().then_some(pct)
}

/// Evaluates every strategy against `history` and returns the ones that fire.
pub fn evaluate(
    instrument: &Instrument,
    history: &PriceHistory,
    strategies: &[StrategyConfig],
) -> Vec<DetectionResult> {
    strategies
        .iter()
        .filter_map(|strategy| evaluate_one(instrument, history, strategy))
        .collect()
}

fn evaluate_one(
    instrument: &Instrument,
    history: &PriceHistory,
    strategy: &StrategyConfig,
) -> Option<DetectionResult> {
    let (baseline, current) = history.earliest_and_latest_within(strategy.lookback_ms())?;
    let pct = percent_change(baseline, current)?;

    if !strategy.fires(pct) {
        return None;
    }

    Some(DetectionResult {
        instrument: instrument.clone(),
        strategy_name: strategy.name.clone(),
        direction: strategy.direction,
        percent_change: pct.abs(),
        lookback_minutes: strategy.lookback_minutes,
        cooldown_ms: strategy.cooldown_ms(),
        baseline_price: baseline,
        current_price: current,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PriceSample;

    const MIN: u64 = 60_000;

    fn history(samples: &[(u64, f64)]) -> PriceHistory {
        let mut h = PriceHistory::new();
        for &(ts, p) in samples {
            h.push(PriceSample::new(ts, p), 60 * MIN);
        }
        h
    }

    fn x() -> Instrument {
        Instrument::new("X")
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn change_formula() {
        assert!(approx(percent_change(100.0, 105.0).unwrap(), 5.0));
        assert!(approx(percent_change(100.0, 95.0).unwrap(), -5.0));
    }

    #[test]
    fn zero_baseline_is_absent() {
        assert_eq!(percent_change(0.0, 10.0), None);

        let h = history(&[(0, 0.0), (MIN, 10.0)]);
        let out = evaluate(&x(), &h, &[StrategyConfig::rising("long", 1, 1.0)]);
        assert!(out.is_empty());
    }

    #[test]
    fn rising_fires_at_102_5_not_at_101_9() {
        let strategy = [StrategyConfig::rising("long", 10, 2.0)];

        let fired = evaluate(&x(), &history(&[(0, 100.0), (10 * MIN, 102.5)]), &strategy);
        assert_eq!(fired.len(), 1);
        assert!(approx(fired[0].percent_change, 2.5));

        let quiet = evaluate(&x(), &history(&[(0, 100.0), (10 * MIN, 101.9)]), &strategy);
        assert!(quiet.is_empty());
    }

    #[test]
    fn falling_fires_at_94_not_at_96_and_reports_magnitude() {
        let strategy = [StrategyConfig::falling("dump", 30, 5.0)];

        let fired = evaluate(&x(), &history(&[(0, 100.0), (30 * MIN, 94.0)]), &strategy);
        assert_eq!(fired.len(), 1);
        assert!(approx(fired[0].percent_change, 6.0));
        assert!(approx(fired[0].signed_change(), -6.0));
        assert_eq!(fired[0].direction, Direction::Falling);

        let quiet = evaluate(&x(), &history(&[(0, 100.0), (30 * MIN, 96.0)]), &strategy);
        assert!(quiet.is_empty());
    }

    #[test]
    fn too_short_history_is_skipped() {
        let out = evaluate(
            &x(),
            &history(&[(0, 100.0)]),
            &[StrategyConfig::rising("long", 1, 0.1)],
        );
        assert!(out.is_empty());
    }

    #[test]
    fn strategies_fire_independently() {
        // 10m ago 100, 1m ago 80, now 70: both windows show a drop.
        let h = history(&[(0, 100.0), (9 * MIN, 80.0), (10 * MIN, 70.0)]);
        let strategies = [
            StrategyConfig::falling("short", 1, 10.0),
            StrategyConfig::falling("dump", 10, 20.0),
            StrategyConfig::rising("long", 1, 1.0),
        ];

        let out = evaluate(&x(), &h, &strategies);
        let names: Vec<_> = out.iter().map(|r| r.strategy_name.as_str()).collect();

        assert_eq!(names, vec!["short", "dump"]);
        assert!(approx(out[0].percent_change, 12.5));
        assert!(approx(out[1].percent_change, 30.0));
    }

    #[test]
    fn end_to_end_window_scenario() {
        let h = history(&[(0, 100.0), (MIN, 100.0), (2 * MIN, 103.0)]);
        let out = evaluate(&x(), &h, &[StrategyConfig::rising("long", 2, 2.0)]);

        assert_eq!(out.len(), 1);
        let r = &out[0];
        assert_eq!(r.baseline_price, 100.0);
        assert_eq!(r.current_price, 103.0);
        assert!(approx(r.percent_change, 3.0));
        assert_eq!(r.lookback_minutes, 2);
        assert_eq!(r.cooldown_ms, 2 * MIN);
    }
}
