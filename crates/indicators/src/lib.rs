// In crates/indicators/src/lib.rs

use core_types::Kline;
use rust_decimal::prelude::*;
use ta::indicators::{
    AverageTrueRange, BollingerBands, ExponentialMovingAverage as Ema,
    MovingAverageConvergenceDivergence as Macd, RelativeStrengthIndex as Rsi,
    SimpleMovingAverage as Sma, SlowStochastic,
};
use ta::{DataItem, Next};

pub mod adx;
pub mod error;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use types::IndicatorSettings;

/// The latest-bar indicator values for one (symbol, timeframe).
///
/// Computed fresh each polling cycle from raw candles and discarded after
/// classification. Everything is `f64`: this is the boundary where exchange
/// decimals become indicator arithmetic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub ema: f64,
    pub macd_histogram: f64,
    pub atr: f64,
    pub adx: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub rsi: f64,
    pub stoch_k: f64,
    pub volume: f64,
    pub volume_ma: f64,
}

/// Computes the full indicator snapshot for a candle series.
///
/// Fails with `InsufficientData` when fewer than `settings.min_bars` bars are
/// available; indicator warm-up on anything shorter is too noisy to trade on.
pub fn compute(bars: &[Kline], settings: &IndicatorSettings) -> Result<IndicatorSnapshot> {
    if bars.len() < settings.min_bars {
        return Err(Error::InsufficientData {
            have: bars.len(),
            need: settings.min_bars,
        });
    }

    let mut ema = Ema::new(settings.ema_period).unwrap();
    let mut macd = Macd::new(
        settings.macd_fast_period,
        settings.macd_slow_period,
        settings.macd_signal_period,
    )
    .unwrap();
    let mut atr = AverageTrueRange::new(settings.atr_period).unwrap();
    let mut bbands = BollingerBands::new(settings.bb_period, settings.bb_stddev).unwrap();
    let mut rsi = Rsi::new(settings.rsi_period).unwrap();
    let mut stoch = SlowStochastic::new(settings.stoch_period, settings.stoch_smooth).unwrap();
    let mut volume_sma = Sma::new(settings.volume_ma_period).unwrap();

    let mut highs = Vec::with_capacity(bars.len());
    let mut lows = Vec::with_capacity(bars.len());
    let mut closes = Vec::with_capacity(bars.len());

    let mut last_ema = f64::NAN;
    let mut last_macd_histogram = f64::NAN;
    let mut last_atr = f64::NAN;
    let mut last_bb = None;
    let mut last_rsi = f64::NAN;
    let mut last_stoch = f64::NAN;
    let mut last_volume = f64::NAN;
    let mut last_volume_ma = f64::NAN;

    for bar in bars {
        let open = bar.open.to_f64().unwrap_or(0.0);
        let high = bar.high.to_f64().unwrap_or(0.0);
        let low = bar.low.to_f64().unwrap_or(0.0);
        let close = bar.close.to_f64().unwrap_or(0.0);
        let volume = bar.volume.to_f64().unwrap_or(0.0);

        let item = DataItem::builder()
            .open(open)
            .high(high)
            .low(low)
            .close(close)
            .volume(volume)
            .build()
            .map_err(|_| Error::MalformedBar {
                open_time: bar.open_time,
            })?;

        last_ema = ema.next(close);
        last_macd_histogram = macd.next(close).histogram;
        last_atr = atr.next(&item);
        last_bb = Some(bbands.next(close));
        last_rsi = rsi.next(close);
        last_stoch = stoch.next(close);
        last_volume = volume;
        last_volume_ma = volume_sma.next(volume);

        highs.push(high);
        lows.push(low);
        closes.push(close);
    }

    let bb = last_bb.expect("min_bars check guarantees at least one bar");

    Ok(IndicatorSnapshot {
        close: *closes.last().expect("non-empty"),
        ema: last_ema,
        macd_histogram: last_macd_histogram,
        atr: last_atr,
        adx: adx::wilder_adx(&highs, &lows, &closes, settings.adx_period),
        bb_upper: bb.upper,
        bb_lower: bb.lower,
        rsi: last_rsi,
        stoch_k: last_stoch,
        volume: last_volume,
        volume_ma: last_volume_ma,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn bar(i: i64, close: i64) -> Kline {
        Kline {
            open_time: i * 60_000,
            open: Decimal::from(close - 1),
            high: Decimal::from(close + 2),
            low: Decimal::from(close - 2),
            close: Decimal::from(close),
            volume: Decimal::from(1_000 + i),
        }
    }

    fn rising_series(len: i64) -> Vec<Kline> {
        (0..len).map(|i| bar(i, 100 + i)).collect()
    }

    #[test]
    fn too_few_bars_is_insufficient_data() {
        let settings = IndicatorSettings::default();
        let err = compute(&rising_series(10), &settings).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientData { have: 10, need: 50 }
        ));
    }

    #[test]
    fn rising_series_produces_a_complete_snapshot() {
        let settings = IndicatorSettings::default();
        let snapshot = compute(&rising_series(80), &settings).unwrap();

        assert_eq!(snapshot.close, 179.0);
        // A steadily rising close keeps the EMA below price and the RSI high.
        assert!(snapshot.ema < snapshot.close);
        assert!(snapshot.rsi > 50.0);
        assert!(snapshot.atr > 0.0);
        assert!(snapshot.adx > 0.0);
        assert!(snapshot.bb_upper > snapshot.bb_lower);
        assert!(snapshot.volume_ma > 0.0);
        assert!(snapshot.volume > snapshot.volume_ma);
        assert!(!snapshot.macd_histogram.is_nan());
        assert!(!snapshot.stoch_k.is_nan());
    }
}
