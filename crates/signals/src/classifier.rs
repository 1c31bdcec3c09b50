// In crates/signals/src/classifier.rs

use crate::error::{Error, Result};
use crate::types::{ClassifierSettings, TimeframeFactors};
use core_types::{SignalDecision, SignalKind, Timeframe};
use indicators::IndicatorSnapshot;

/// Everything a rule needs to evaluate one snapshot.
pub struct RuleInput<'a> {
    pub snapshot: &'a IndicatorSnapshot,
    pub timeframe: Timeframe,
    pub factors: TimeframeFactors,
    pub settings: &'a ClassifierSettings,
}

/// One rule of the engine: a predicate plus the price targets it implies.
struct Rule {
    kind: SignalKind,
    applies: fn(&RuleInput) -> bool,
    targets: fn(&RuleInput) -> (f64, f64, f64),
}

/// The rule table, in priority order. The first predicate that holds wins,
/// so spot rules shadow the looser futures rules when both would fire.
const RULES: [Rule; 4] = [
    Rule {
        kind: SignalKind::SpotLong,
        applies: spot_long_applies,
        targets: spot_long_targets,
    },
    Rule {
        kind: SignalKind::SpotShort,
        applies: spot_short_applies,
        targets: spot_short_targets,
    },
    Rule {
        kind: SignalKind::FuturesLong,
        applies: futures_long_applies,
        targets: futures_long_targets,
    },
    Rule {
        kind: SignalKind::FuturesShort,
        applies: futures_short_applies,
        targets: futures_short_targets,
    },
];

/// Classifies one indicator snapshot into a trading decision.
///
/// Returns `NoSignal` with no prices when no rule fires. Fails with
/// `MissingIndicator` when a field the rules read is NaN; the caller logs
/// that and moves on rather than trading on a half-built snapshot.
pub fn classify(
    snapshot: &IndicatorSnapshot,
    timeframe: Timeframe,
    settings: &ClassifierSettings,
) -> Result<SignalDecision> {
    validate(snapshot)?;

    let input = RuleInput {
        snapshot,
        timeframe,
        factors: TimeframeFactors::for_timeframe(timeframe),
        settings,
    };

    for rule in &RULES {
        if (rule.applies)(&input) {
            let (entry, tp, sl) = (rule.targets)(&input);
            tracing::debug!(timeframe = %timeframe, kind = %rule.kind, entry, tp, sl, "rule fired");
            return Ok(SignalDecision {
                kind: rule.kind,
                entry: Some(entry),
                tp: Some(tp),
                sl: Some(sl),
            });
        }
    }

    Ok(SignalDecision::none())
}

fn validate(snapshot: &IndicatorSnapshot) -> Result<()> {
    let required = [
        ("close", snapshot.close),
        ("ema", snapshot.ema),
        ("macd_histogram", snapshot.macd_histogram),
        ("atr", snapshot.atr),
        ("adx", snapshot.adx),
        ("bb_upper", snapshot.bb_upper),
        ("bb_lower", snapshot.bb_lower),
        ("volume", snapshot.volume),
        ("volume_ma", snapshot.volume_ma),
    ];
    for (name, value) in required {
        if value.is_nan() {
            return Err(Error::MissingIndicator(name));
        }
    }
    Ok(())
}

// --- Predicates ---

fn spot_long_applies(input: &RuleInput) -> bool {
    let s = input.snapshot;
    let f = input.factors;
    let c = input.settings;
    s.close > s.ema
        && s.macd_histogram > c.macd_threshold * f.macd
        && s.adx > c.adx_threshold * f.adx
        && s.close < s.bb_upper * (1.0 - c.bb_threshold)
        && s.volume > s.volume_ma * c.volume_ratio * f.volume
}

fn spot_short_applies(input: &RuleInput) -> bool {
    let s = input.snapshot;
    let f = input.factors;
    let c = input.settings;
    s.close < s.ema
        && s.macd_histogram < -c.macd_threshold * f.macd
        && s.adx > c.adx_threshold * f.adx
        && s.close > s.bb_lower * (1.0 + c.bb_threshold)
        && s.volume > s.volume_ma * c.volume_ratio * f.volume
}

fn futures_long_applies(input: &RuleInput) -> bool {
    let s = input.snapshot;
    let f = input.factors;
    let c = input.settings;
    input.timeframe.is_short_horizon()
        && s.close > s.ema
        && s.macd_histogram > c.macd_threshold * f.macd
        && s.adx > c.adx_threshold * f.adx * c.futures_adx_factor
        && s.volume > s.volume_ma * c.futures_volume_spike * f.volume
}

fn futures_short_applies(input: &RuleInput) -> bool {
    let s = input.snapshot;
    let f = input.factors;
    let c = input.settings;
    input.timeframe.is_short_horizon()
        && s.close < s.ema
        && s.macd_histogram < -c.macd_threshold * f.macd
        && s.adx > c.adx_threshold * f.adx * c.futures_adx_factor
        && s.volume > s.volume_ma * c.futures_volume_spike * f.volume
}

// --- Price targets ---

fn spot_long_targets(input: &RuleInput) -> (f64, f64, f64) {
    let entry = input.snapshot.close;
    let atr = input.snapshot.atr;
    (entry, entry + atr * input.settings.risk_reward, entry - atr)
}

fn spot_short_targets(input: &RuleInput) -> (f64, f64, f64) {
    let entry = input.snapshot.close;
    let atr = input.snapshot.atr;
    (entry, entry - atr * input.settings.risk_reward, entry + atr)
}

fn futures_long_targets(input: &RuleInput) -> (f64, f64, f64) {
    let entry = input.snapshot.close;
    let atr = input.snapshot.atr * input.settings.futures_atr_multiplier;
    (
        entry,
        entry + atr * input.settings.futures_risk_reward,
        entry - atr,
    )
}

fn futures_short_targets(input: &RuleInput) -> (f64, f64, f64) {
    let entry = input.snapshot.close;
    let atr = input.snapshot.atr * input.settings.futures_atr_multiplier;
    (
        entry,
        entry - atr * input.settings.futures_risk_reward,
        entry + atr,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A quiet market: no rule fires on this snapshot.
    fn neutral_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            close: 100.0,
            ema: 100.0,
            macd_histogram: 0.0,
            atr: 2.0,
            adx: 10.0,
            bb_upper: 110.0,
            bb_lower: 90.0,
            rsi: 50.0,
            stoch_k: 50.0,
            volume: 1_000.0,
            volume_ma: 1_000.0,
        }
    }

    /// Trending up hard enough to satisfy the spot-long rule on 4h
    /// (factors 1.0) and, on short timeframes, the futures-long rule too.
    fn bullish_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            close: 100.0,
            ema: 95.0,
            macd_histogram: 0.5,
            atr: 2.0,
            adx: 30.0,
            bb_upper: 110.0,
            bb_lower: 90.0,
            rsi: 65.0,
            stoch_k: 70.0,
            volume: 2_000.0,
            volume_ma: 1_000.0,
        }
    }

    fn bearish_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            close: 90.0,
            ema: 95.0,
            macd_histogram: -0.5,
            atr: 2.0,
            adx: 30.0,
            bb_upper: 110.0,
            bb_lower: 80.0,
            rsi: 35.0,
            stoch_k: 30.0,
            volume: 2_000.0,
            volume_ma: 1_000.0,
        }
    }

    fn settings() -> ClassifierSettings {
        ClassifierSettings::default()
    }

    #[test]
    fn quiet_market_yields_no_signal_with_no_prices() {
        let decision = classify(&neutral_snapshot(), Timeframe::H1, &settings()).unwrap();
        assert_eq!(decision.kind, SignalKind::NoSignal);
        assert_eq!(decision.entry, None);
        assert_eq!(decision.tp, None);
        assert_eq!(decision.sl, None);
    }

    #[test]
    fn spot_long_fires_and_targets_bracket_the_entry() {
        let decision = classify(&bullish_snapshot(), Timeframe::H4, &settings()).unwrap();
        assert_eq!(decision.kind, SignalKind::SpotLong);
        let (entry, tp, sl) = (
            decision.entry.unwrap(),
            decision.tp.unwrap(),
            decision.sl.unwrap(),
        );
        assert!(tp > entry && entry > sl);
        assert_eq!(tp, 100.0 + 2.0 * 1.8);
        assert_eq!(sl, 98.0);
    }

    #[test]
    fn spot_short_fires_and_targets_bracket_the_entry() {
        let decision = classify(&bearish_snapshot(), Timeframe::H4, &settings()).unwrap();
        assert_eq!(decision.kind, SignalKind::SpotShort);
        let (entry, tp, sl) = (
            decision.entry.unwrap(),
            decision.tp.unwrap(),
            decision.sl.unwrap(),
        );
        assert!(tp < entry && entry < sl);
    }

    #[test]
    fn spot_takes_priority_over_futures_when_both_would_fire() {
        // On 15m the bullish snapshot satisfies both the spot-long and the
        // futures-long predicate; the rule order must pick spot.
        let input = RuleInput {
            snapshot: &bullish_snapshot(),
            timeframe: Timeframe::M15,
            factors: TimeframeFactors::for_timeframe(Timeframe::M15),
            settings: &settings(),
        };
        assert!(spot_long_applies(&input));
        assert!(futures_long_applies(&input));

        let decision = classify(&bullish_snapshot(), Timeframe::M15, &settings()).unwrap();
        assert_eq!(decision.kind, SignalKind::SpotLong);
    }

    #[test]
    fn futures_long_fires_when_spot_is_blocked_by_the_band_margin() {
        // Price pressed into the upper band: too extended for spot, still a
        // valid short-horizon breakout for futures.
        let mut snapshot = bullish_snapshot();
        snapshot.bb_upper = 100.5;
        let decision = classify(&snapshot, Timeframe::M15, &settings()).unwrap();
        assert_eq!(decision.kind, SignalKind::FuturesLong);

        let (entry, tp, sl) = (
            decision.entry.unwrap(),
            decision.tp.unwrap(),
            decision.sl.unwrap(),
        );
        assert!(tp > entry && entry > sl);
        // Futures targets use the scaled ATR: 2.0 × 0.8.
        assert_eq!(sl, 100.0 - 1.6);
        assert_eq!(tp, 100.0 + 1.6 * 0.8);
    }

    #[test]
    fn futures_rules_never_fire_on_long_timeframes() {
        let mut snapshot = bullish_snapshot();
        snapshot.bb_upper = 100.5; // blocks spot long
        for timeframe in [Timeframe::H4, Timeframe::D1] {
            let decision = classify(&snapshot, timeframe, &settings()).unwrap();
            assert_eq!(decision.kind, SignalKind::NoSignal, "{timeframe}");
        }
    }

    #[test]
    fn futures_short_brackets_mirror_the_long_side() {
        let mut snapshot = bearish_snapshot();
        snapshot.bb_lower = 89.5; // blocks spot short
        let decision = classify(&snapshot, Timeframe::M30, &settings()).unwrap();
        assert_eq!(decision.kind, SignalKind::FuturesShort);
        let (entry, tp, sl) = (
            decision.entry.unwrap(),
            decision.tp.unwrap(),
            decision.sl.unwrap(),
        );
        assert!(tp < entry && entry < sl);
    }

    #[test]
    fn adx_below_every_bar_yields_no_signal() {
        let mut snapshot = bullish_snapshot();
        snapshot.adx = 5.0;
        for timeframe in Timeframe::ALL {
            let decision = classify(&snapshot, timeframe, &settings()).unwrap();
            assert_eq!(decision.kind, SignalKind::NoSignal, "{timeframe}");
            assert_eq!(decision.entry, None);
        }
    }

    #[test]
    fn short_timeframes_use_looser_macd_bars() {
        // Histogram of 0.025 is under the 4h bar (0.03) but over the 15m bar
        // (0.03 × 0.6 = 0.018).
        let mut snapshot = bullish_snapshot();
        snapshot.macd_histogram = 0.025;
        snapshot.volume = 2_000.0; // 15m volume factor is 1.3

        let on_4h = classify(&snapshot, Timeframe::H4, &settings()).unwrap();
        assert_eq!(on_4h.kind, SignalKind::NoSignal);

        let on_15m = classify(&snapshot, Timeframe::M15, &settings()).unwrap();
        assert_eq!(on_15m.kind, SignalKind::SpotLong);
    }

    #[test]
    fn futures_adx_bar_is_lower_than_spot() {
        // ADX 17 fails the spot bar on 1h (20 × 0.9 = 18) but clears the
        // futures bar (18 × 0.8 = 14.4).
        let mut snapshot = bullish_snapshot();
        snapshot.adx = 17.0;
        let decision = classify(&snapshot, Timeframe::H1, &settings()).unwrap();
        assert_eq!(decision.kind, SignalKind::FuturesLong);
    }

    #[test]
    fn nan_indicator_is_reported_not_defaulted() {
        let mut snapshot = bullish_snapshot();
        snapshot.adx = f64::NAN;
        let err = classify(&snapshot, Timeframe::H1, &settings()).unwrap_err();
        assert!(matches!(err, Error::MissingIndicator("adx")));
    }
}
