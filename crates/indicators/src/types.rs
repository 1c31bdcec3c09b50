// In crates/indicators/src/types.rs

use serde::{Deserialize, Serialize};

/// Periods for every indicator the snapshot carries.
///
/// Constructed once from configuration and passed by reference into
/// `compute`; the defaults match the production deployment.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct IndicatorSettings {
    /// Minimum bars required before a snapshot is considered meaningful.
    pub min_bars: usize,
    pub ema_period: usize,
    pub macd_fast_period: usize,
    pub macd_slow_period: usize,
    pub macd_signal_period: usize,
    pub atr_period: usize,
    pub adx_period: usize,
    pub bb_period: usize,
    pub bb_stddev: f64,
    pub rsi_period: usize,
    pub stoch_period: usize,
    pub stoch_smooth: usize,
    pub volume_ma_period: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            min_bars: 50,
            ema_period: 20,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
            atr_period: 14,
            adx_period: 14,
            bb_period: 20,
            bb_stddev: 2.0,
            rsi_period: 14,
            stoch_period: 14,
            stoch_smooth: 3,
            volume_ma_period: 20,
        }
    }
}
