/// Moving Average Convergence Divergence (MACD).
///
/// `line = EMA(fast) - EMA(slow)`, `signal = EMA(line, signal_period)`,
/// `histogram = line - signal`. Standard periods: 12/26/9.
use super::moving_average::calculate_ema_series;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Macd {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

pub fn calculate_macd(
    prices: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Option<Macd> {
    if prices.len() < slow_period + signal_period {
        return None;
    }

    let fast_series = calculate_ema_series(prices, fast_period)?;
    let slow_series = calculate_ema_series(prices, slow_period)?;

    // fast_series is longer than slow_series by (slow_period - fast_period)
    // bars (both are seeded at their own period). Align on the tail.
    let offset = fast_series.len() - slow_series.len();
    let macd_line: Vec<f64> = slow_series
        .iter()
        .enumerate()
        .map(|(i, &slow)| fast_series[i + offset] - slow)
        .collect();

    if macd_line.len() < signal_period {
        return None;
    }

    let signal_series = calculate_ema_series(&macd_line, signal_period)?;
    let line = *macd_line.last().unwrap();
    let signal = *signal_series.last().unwrap();

    Some(Macd {
        line,
        signal,
        histogram: line - signal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_on_rising_series_is_positive() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.8).collect();
        let macd = calculate_macd(&prices, 12, 26, 9).unwrap();
        assert!(macd.line > 0.0, "fast EMA should lead slow EMA upward");
    }

    #[test]
    fn macd_insufficient_data_is_none() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert!(calculate_macd(&prices, 12, 26, 9).is_none());
    }
}
