// In crates/signals/src/types.rs

use core_types::Timeframe;
use serde::{Deserialize, Serialize};

/// Threshold parameters for the rule engine.
///
/// One immutable value constructed from configuration and passed by
/// reference into `classify`. Defaults are the production values.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Minimum MACD histogram magnitude before momentum counts.
    pub macd_threshold: f64,
    /// Minimum trend strength for any rule to fire.
    pub adx_threshold: f64,
    /// Proximity margin to the Bollinger band: longs must sit at least this
    /// fraction below the upper band, shorts above the lower band.
    pub bb_threshold: f64,
    /// Volume must exceed its moving average by this ratio.
    pub volume_ratio: f64,
    /// Spot take-profit distance in ATRs (stop-loss is one ATR).
    pub risk_reward: f64,
    /// Futures take-profit distance in futures-ATRs.
    pub futures_risk_reward: f64,
    /// Futures ATR scale: both targets sit at ATR × this multiplier.
    pub futures_atr_multiplier: f64,
    /// Futures volume-spike ratio, replaces `volume_ratio`.
    pub futures_volume_spike: f64,
    /// Futures ADX bar as a fraction of the spot bar.
    pub futures_adx_factor: f64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            macd_threshold: 0.03,
            adx_threshold: 20.0,
            bb_threshold: 0.02,
            volume_ratio: 1.05,
            risk_reward: 1.8,
            futures_risk_reward: 0.8,
            futures_atr_multiplier: 0.8,
            futures_volume_spike: 1.2,
            futures_adx_factor: 0.8,
        }
    }
}

/// Per-timeframe scaling applied to the base thresholds before evaluation.
///
/// Short timeframes are noisier, so they get looser MACD/ADX bars but a
/// stiffer volume requirement; the daily chart is the opposite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeframeFactors {
    pub macd: f64,
    pub adx: f64,
    pub volume: f64,
}

impl TimeframeFactors {
    pub fn for_timeframe(timeframe: Timeframe) -> Self {
        match timeframe {
            Timeframe::M15 => Self { macd: 0.6, adx: 0.8, volume: 1.3 },
            Timeframe::M30 => Self { macd: 0.7, adx: 0.85, volume: 1.2 },
            Timeframe::H1 => Self { macd: 0.9, adx: 0.9, volume: 1.1 },
            Timeframe::H4 => Self { macd: 1.0, adx: 1.0, volume: 1.0 },
            Timeframe::D1 => Self { macd: 1.1, adx: 1.1, volume: 0.9 },
        }
    }
}
