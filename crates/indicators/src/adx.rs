// In crates/indicators/src/adx.rs

/// Average Directional Index with Wilder's smoothing.
///
/// The `ta` crate has no ADX, so the directional-movement pipeline is done by
/// hand: true range and +DM/-DM per bar, Wilder-smoothed over `period`, DI
/// spread into DX, then DX Wilder-smoothed into ADX. Returns the ADX of the
/// final bar, or NaN when the series is shorter than the 2×period warm-up the
/// calculation needs.
pub fn wilder_adx(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> f64 {
    let len = highs.len();
    if period == 0 || len <= period * 2 {
        return f64::NAN;
    }

    let mut tr = vec![0.0; len];
    let mut plus_dm = vec![0.0; len];
    let mut minus_dm = vec![0.0; len];
    for i in 1..len {
        let up_move = highs[i] - highs[i - 1];
        let down_move = lows[i - 1] - lows[i];
        if up_move > 0.0 && up_move > down_move {
            plus_dm[i] = up_move;
        }
        if down_move > 0.0 && down_move > up_move {
            minus_dm[i] = down_move;
        }
        tr[i] = (highs[i] - lows[i])
            .max((highs[i] - closes[i - 1]).abs())
            .max((lows[i] - closes[i - 1]).abs());
    }

    let p = period as f64;

    // Seed the smoothed values with a simple average of the first period.
    let mut tr_smooth = tr[1..=period].iter().sum::<f64>() / p;
    let mut plus_smooth = plus_dm[1..=period].iter().sum::<f64>() / p;
    let mut minus_smooth = minus_dm[1..=period].iter().sum::<f64>() / p;

    let mut dx = Vec::with_capacity(len - period);
    dx.push(dx_value(tr_smooth, plus_smooth, minus_smooth));

    for i in period + 1..len {
        tr_smooth = (tr_smooth * (p - 1.0) + tr[i]) / p;
        plus_smooth = (plus_smooth * (p - 1.0) + plus_dm[i]) / p;
        minus_smooth = (minus_smooth * (p - 1.0) + minus_dm[i]) / p;
        dx.push(dx_value(tr_smooth, plus_smooth, minus_smooth));
    }

    // ADX: Wilder smoothing over the DX series, seeded with its first
    // period-average.
    let mut adx = dx[..=period].iter().sum::<f64>() / (period as f64 + 1.0);
    for value in &dx[period + 1..] {
        adx = (adx * (p - 1.0) + value) / p;
    }
    adx
}

fn dx_value(tr_smooth: f64, plus_smooth: f64, minus_smooth: f64) -> f64 {
    if tr_smooth == 0.0 {
        return 0.0;
    }
    let plus_di = 100.0 * plus_smooth / tr_smooth;
    let minus_di = 100.0 * minus_smooth / tr_smooth;
    let spread = plus_di + minus_di;
    if spread == 0.0 {
        0.0
    } else {
        100.0 * (plus_di - minus_di).abs() / spread
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_series_is_nan() {
        let flat = vec![10.0; 20];
        assert!(wilder_adx(&flat, &flat, &flat, 14).is_nan());
    }

    #[test]
    fn strong_one_way_trend_scores_high() {
        let n = 60;
        let highs: Vec<f64> = (0..n).map(|i| 101.0 + i as f64).collect();
        let lows: Vec<f64> = (0..n).map(|i| 99.0 + i as f64).collect();
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        let adx = wilder_adx(&highs, &lows, &closes, 14);
        // Every bar moves up, so directional movement is one-sided.
        assert!(adx > 50.0, "adx = {adx}");
    }

    #[test]
    fn flat_market_scores_zero() {
        let highs = vec![101.0; 60];
        let lows = vec![99.0; 60];
        let closes = vec![100.0; 60];
        let adx = wilder_adx(&highs, &lows, &closes, 14);
        assert!(adx.abs() < f64::EPSILON, "adx = {adx}");
    }
}
