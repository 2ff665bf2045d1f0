/// Volume-Weighted Average Price over the whole supplied series. Callers
/// pass the slice they want VWAP computed over (e.g. the primary OHLCV
/// series, or just the current session's bars).
use crate::models::Candle;

pub fn calculate_vwap(candles: &[Candle]) -> Option<f64> {
    if candles.is_empty() {
        return None;
    }

    let mut cumulative_pv = 0.0;
    let mut cumulative_volume = 0.0;

    for candle in candles {
        let typical_price = (candle.high + candle.low + candle.close) / 3.0;
        cumulative_pv += typical_price * candle.volume;
        cumulative_volume += candle.volume;
    }

    if cumulative_volume == 0.0 {
        return None;
    }

    Some(cumulative_pv / cumulative_volume)
}
