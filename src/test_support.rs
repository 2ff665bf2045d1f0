//! Shared test fixtures, colocated the way the teacher's indicator modules
//! each define their own local `create_test_candles` helper — centralized
//! here instead since most of this engine's modules need the same shapes.
#![cfg(test)]

use crate::models::Candle;
use chrono::{DateTime, Duration, Utc};

pub fn base_ts() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Build a candle series from closes only; open/high/low are derived with a
/// small fixed spread around each close.
pub fn series_from_closes(closes: &[f64]) -> Vec<Candle> {
    let base = base_ts();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle {
            ts: base + Duration::hours(i as i64),
            open: close,
            high: close * 1.002,
            low: close * 0.998,
            close,
            volume: 1_000.0,
        })
        .collect()
}

/// Build a candle series from explicit OHLC tuples (volume fixed at 1000).
pub fn series_from_ohlc(bars: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
    let base = base_ts();
    bars.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Candle {
            ts: base + Duration::hours(i as i64),
            open,
            high,
            low,
            close,
            volume: 1_000.0,
        })
        .collect()
}

/// A monotonically rising series, useful for bullish-structure fixtures
/// (S2): `n` bars, starting at `start`, rising by `step` each bar.
pub fn rising_series(n: usize, start: f64, step: f64) -> Vec<Candle> {
    let closes: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
    series_from_closes(&closes)
}
