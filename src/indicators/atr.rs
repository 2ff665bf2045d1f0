/// Average True Range (ATR) indicator
///
/// Measures market volatility by calculating the average of true ranges over a period.
/// True Range is the greatest of:
/// - Current High - Current Low
/// - Abs(Current High - Previous Close)
/// - Abs(Current Low - Previous Close)
///
/// Uses Wilder's smoothing (same as RSI and ADX) for the moving average.

use crate::models::Candle;

/// Calculate ATR for the given candles
///
/// Returns the current ATR value, or None if insufficient data
pub fn calculate_atr(candles: &[Candle], period: usize) -> Option<f64> {
    if candles.len() < period + 1 {
        return None;
    }

    // Calculate true ranges
    let mut true_ranges = Vec::new();
    for i in 1..candles.len() {
        let high = candles[i].high;
        let low = candles[i].low;
        let prev_close = candles[i - 1].close;

        let tr = (high - low)
            .max((high - prev_close).abs())
            .max((low - prev_close).abs());

        true_ranges.push(tr);
    }

    if true_ranges.len() < period {
        return None;
    }

    // First ATR is simple average of first 'period' true ranges
    let first_atr: f64 = true_ranges.iter().take(period).sum::<f64>() / period as f64;

    // Apply Wilder's smoothing for subsequent values
    let mut atr = first_atr;
    for i in period..true_ranges.len() {
        atr = (atr * (period as f64 - 1.0) + true_ranges[i]) / period as f64;
    }

    Some(atr)
}

/// Calculate ATR and return all intermediate values (for analysis)
///
/// Returns vector of ATR values aligned with candles (starting from index period)
pub fn calculate_atr_series(candles: &[Candle], period: usize) -> Vec<f64> {
    if candles.len() < period + 1 {
        return Vec::new();
    }

    // Calculate true ranges
    let mut true_ranges = Vec::new();
    for i in 1..candles.len() {
        let high = candles[i].high;
        let low = candles[i].low;
        let prev_close = candles[i - 1].close;

        let tr = (high - low)
            .max((high - prev_close).abs())
            .max((low - prev_close).abs());

        true_ranges.push(tr);
    }

    if true_ranges.len() < period {
        return Vec::new();
    }

    let mut atr_series = Vec::new();

    // First ATR is simple average of first 'period' true ranges
    let first_atr: f64 = true_ranges.iter().take(period).sum::<f64>() / period as f64;
    atr_series.push(first_atr);

    // Apply Wilder's smoothing for subsequent values
    let mut atr = first_atr;
    for i in period..true_ranges.len() {
        atr = (atr * (period as f64 - 1.0) + true_ranges[i]) / period as f64;
        atr_series.push(atr);
    }

    atr_series
}

/// Check if ATR has spiked above threshold (indicates volatility explosion)
///
/// Returns true if current ATR > threshold * recent average ATR
pub fn is_atr_spike(candles: &[Candle], period: usize, lookback: usize, threshold: f64) -> bool {
    if candles.len() < period + lookback + 1 {
        return false;
    }

    let atr_series = calculate_atr_series(candles, period);
    if atr_series.len() < lookback + 1 {
        return false;
    }

    let current_atr = atr_series[atr_series.len() - 1];

    // Calculate average ATR over lookback period (excluding current)
    let lookback_start = atr_series.len().saturating_sub(lookback + 1);
    let lookback_end = atr_series.len() - 1;

    let avg_atr = atr_series[lookback_start..lookback_end].iter().sum::<f64>()
        / (lookback_end - lookback_start) as f64;

    current_atr > threshold * avg_atr
}
