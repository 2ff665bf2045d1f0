/// Average Directional Index (ADX) - Measures trend strength
///
/// ADX ranges from 0 to 100:
/// - ADX > 25: Strong trend (bull or bear)
/// - ADX 20-25: Moderate trend
/// - ADX < 20: Weak trend / choppy / ranging market
///
/// Also returns +DI and -DI to determine trend direction:
/// - +DI > -DI: Uptrend
/// - -DI > +DI: Downtrend
use crate::models::Candle;

/// Calculate ADX, +DI, and -DI for trend strength and direction
///
/// Returns (adx, plus_di, minus_di) or None if insufficient data.
///
/// ADX itself is a Wilder-smoothed average of DX over `period` bars, not a
/// single bar's DX — using raw DX as an ADX stand-in understates trend
/// strength persistence and overreacts to single-bar noise.
pub fn calculate_adx(candles: &[Candle], period: usize) -> Option<(f64, f64, f64)> {
    if candles.len() < period + 1 {
        return None;
    }

    let mut true_ranges = Vec::new();
    let mut plus_dms = Vec::new();
    let mut minus_dms = Vec::new();

    for i in 1..candles.len() {
        let high = candles[i].high;
        let low = candles[i].low;
        let prev_close = candles[i - 1].close;
        let prev_high = candles[i - 1].high;
        let prev_low = candles[i - 1].low;

        let tr = (high - low)
            .max((high - prev_close).abs())
            .max((low - prev_close).abs());
        true_ranges.push(tr);

        let up_move = high - prev_high;
        let down_move = prev_low - low;

        let plus_dm = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        let minus_dm = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };

        plus_dms.push(plus_dm);
        minus_dms.push(minus_dm);
    }

    if true_ranges.len() < period {
        return None;
    }

    let smoothed_tr = wilder_smooth_series(&true_ranges, period)?;
    let smoothed_plus_dm = wilder_smooth_series(&plus_dms, period)?;
    let smoothed_minus_dm = wilder_smooth_series(&minus_dms, period)?;

    let mut dx_series = Vec::with_capacity(smoothed_tr.len());
    let mut plus_di_last = 0.0;
    let mut minus_di_last = 0.0;

    for i in 0..smoothed_tr.len() {
        let plus_di = if smoothed_tr[i] > 0.0 {
            (smoothed_plus_dm[i] / smoothed_tr[i]) * 100.0
        } else {
            0.0
        };
        let minus_di = if smoothed_tr[i] > 0.0 {
            (smoothed_minus_dm[i] / smoothed_tr[i]) * 100.0
        } else {
            0.0
        };

        let di_sum = plus_di + minus_di;
        let dx = if di_sum > 0.0 {
            ((plus_di - minus_di).abs() / di_sum) * 100.0
        } else {
            0.0
        };

        dx_series.push(dx);
        plus_di_last = plus_di;
        minus_di_last = minus_di;
    }

    let adx = if dx_series.len() >= period {
        wilder_smooth_series(&dx_series, period)?
            .last()
            .copied()
            .unwrap_or(0.0)
    } else {
        dx_series.iter().sum::<f64>() / dx_series.len() as f64
    };

    Some((adx, plus_di_last, minus_di_last))
}

/// Wilder's smoothing method (similar to EMA but using Wilder's formula).
/// Returns the full smoothed series, not just the final value, so ADX can
/// smooth DX the same way DI smooths TR/DM.
fn wilder_smooth_series(values: &[f64], period: usize) -> Option<Vec<f64>> {
    if values.len() < period {
        return None;
    }

    let first_smooth: f64 = values[..period].iter().sum::<f64>() / period as f64;
    let mut series = vec![first_smooth];

    let mut smoothed = first_smooth;
    for value in &values[period..] {
        smoothed = (smoothed * (period as f64 - 1.0) + value) / period as f64;
        series.push(smoothed);
    }

    Some(series)
}
