//! Price-Structure Summarizer (§4.3): range, trend state, volatility
//! regime, and swing points, derived purely from OHLCV plus the already
//! computed `IndicatorSet`. No I/O.
pub mod swings;

use crate::models::{Candle, IndicatorSet, PriceStructure, TrendState, VolatilityRegime};
use crate::timeframe::Timeframe;
use std::collections::HashMap;

/// Derive trend state from EMA-20 vs EMA-50 vs close, with ADX for
/// strength (`>30` strong). Sideways when the EMAs straddle close within
/// `0.25·ATR` (§4.3).
fn derive_trend_state(indicators: &IndicatorSet, close: f64, atr: Option<f64>) -> TrendState {
    let ema20 = indicators.get("ema_20").and_then(|v| v.as_scalar());
    let ema50 = indicators.get("ema_50").and_then(|v| v.as_scalar());
    let adx = indicators.get("adx").and_then(|v| v.as_scalar()).unwrap_or(0.0);

    let (Some(ema20), Some(ema50)) = (ema20, ema50) else {
        return TrendState::SidewaysWeak;
    };

    if let Some(atr) = atr {
        let band = 0.25 * atr;
        let interleaved = (ema20 - close).abs() <= band && (ema50 - close).abs() <= band;
        if interleaved {
            return TrendState::SidewaysWeak;
        }
    }

    let strong = adx > 30.0;
    if ema20 > ema50 && close > ema20 {
        if strong {
            TrendState::BullishStrong
        } else {
            TrendState::BullishWeak
        }
    } else if ema20 < ema50 && close < ema20 {
        if strong {
            TrendState::BearishStrong
        } else {
            TrendState::BearishWeak
        }
    } else {
        TrendState::SidewaysWeak
    }
}

/// Trend state for one additional (non-primary) MTF candle series, computed
/// from its own indicator set so `trend_state` can be populated for every
/// collected timeframe, not just the request's own — feeds MTF concordance
/// in the Context Scorer (§4.5).
pub fn trend_for(candles: &[Candle]) -> Option<TrendState> {
    if candles.is_empty() {
        return None;
    }
    let indicators = crate::indicators::indicators(candles);
    let close = candles.last()?.close;
    let atr = indicators.get("atr").and_then(|v| v.as_scalar());
    Some(derive_trend_state(&indicators, close, atr))
}

/// Build the full `PriceStructure` for one timeframe's OHLCV series.
/// `current_price` is normally `candles.last().close`, passed explicitly so
/// callers that maintain their own freshness cursor do not need to rebuild
/// the slice.
pub fn summarize(
    candles: &[Candle],
    timeframe: Timeframe,
    indicators: &IndicatorSet,
    current_price: f64,
) -> Option<PriceStructure> {
    if candles.is_empty() {
        return None;
    }

    let lookback = timeframe.range_lookback().min(candles.len());
    let window = &candles[candles.len() - lookback..];

    let range_high = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let range_low = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let range_size_pct = if range_low > 0.0 {
        (range_high - range_low) / range_low * 100.0
    } else {
        0.0
    };
    let current_position_in_range = if range_high > range_low {
        (current_price - range_low) / (range_high - range_low)
    } else {
        0.5
    };

    let (swing_highs, swing_lows) = swings::detect_swings(candles, current_price);

    let atr = indicators.get("atr").and_then(|v| v.as_scalar());
    let atr_percent = indicators.get("atr_percent").and_then(|v| v.as_scalar());
    let volatility_regime = VolatilityRegime::from_atr_percent(atr_percent.unwrap_or(0.0));

    let trend = derive_trend_state(indicators, current_price, atr);
    let mut trend_state = HashMap::new();
    trend_state.insert(timeframe.as_str(), trend);

    let nearest_support = swing_lows
        .iter()
        .map(|s| s.price)
        .filter(|&p| p <= current_price)
        .fold(None, |acc: Option<f64>, p| match acc {
            Some(best) if (current_price - best).abs() <= (current_price - p).abs() => Some(best),
            _ => Some(p),
        });
    let nearest_resistance = swing_highs
        .iter()
        .map(|s| s.price)
        .filter(|&p| p >= current_price)
        .fold(None, |acc: Option<f64>, p| match acc {
            Some(best) if (best - current_price).abs() <= (p - current_price).abs() => Some(best),
            _ => Some(p),
        });

    let distance_to_support_pct = nearest_support
        .map(|p| (current_price - p) / current_price * 100.0)
        .unwrap_or(0.0);
    let distance_to_resistance_pct = nearest_resistance
        .map(|p| (p - current_price) / current_price * 100.0)
        .unwrap_or(0.0);

    Some(PriceStructure {
        swing_highs,
        swing_lows,
        range_high,
        range_low,
        range_size_pct,
        current_position_in_range,
        trend_state,
        volatility_regime,
        distance_to_support_pct,
        distance_to_resistance_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::indicators as calc_indicators;
    use crate::test_support::rising_series;

    #[test]
    fn bullish_series_yields_bullish_trend_and_range() {
        let candles = rising_series(250, 100.0, 0.5);
        let ind = calc_indicators(&candles);
        let current = candles.last().unwrap().close;
        let structure = summarize(&candles, Timeframe::H4, &ind, current).unwrap();

        assert!(structure.trend_state.get("4h").unwrap().is_bullish());
        assert!(structure.range_high >= structure.range_low);
        assert!(structure.current_position_in_range >= 0.0);
    }

    #[test]
    fn volatility_regime_reaches_very_low_for_tight_series() {
        let candles = rising_series(250, 100.0, 0.01);
        let ind = calc_indicators(&candles);
        let current = candles.last().unwrap().close;
        let structure = summarize(&candles, Timeframe::H4, &ind, current).unwrap();

        assert_eq!(structure.volatility_regime, VolatilityRegime::VeryLow);
    }

    #[test]
    fn empty_series_yields_no_structure() {
        assert!(summarize(&[], Timeframe::H4, &IndicatorSet::new(), 100.0).is_none());
    }
}
