//! Indicator Engine (§4.2): pure functions from OHLCV to scalar indicators,
//! plus `indicators()`, the single entry point that builds the full
//! `IndicatorSet` for a series. No I/O anywhere in this module.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod candlestick;
pub mod macd;
pub mod moving_average;
pub mod obv;
pub mod rsi;
pub mod vwap;

pub use adx::calculate_adx;
pub use atr::{calculate_atr, calculate_atr_series, is_atr_spike};
pub use bollinger::calculate_bollinger;
pub use candlestick::{detect_patterns, CandlePattern};
pub use macd::calculate_macd;
pub use moving_average::{calculate_ema, calculate_ema_series, calculate_sma};
pub use obv::calculate_obv;
pub use rsi::calculate_rsi;
pub use vwap::calculate_vwap;

use crate::models::{Candle, IndicatorSet, IndicatorValue};

const RSI_PERIOD: usize = 14;
const ATR_PERIOD: usize = 14;
const ADX_PERIOD: usize = 14;
const EMA_PERIODS: [usize; 3] = [20, 50, 200];
const SMA_PERIODS: [usize; 2] = [20, 50];
const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;
const BOLLINGER_PERIOD: usize = 20;
const BOLLINGER_STD_DEV: f64 = 2.0;

/// Pure function `indicators(ohlcv) -> IndicatorSet` (§4.2). Any indicator
/// whose window exceeds the series length is simply omitted from the map —
/// never inserted as a zero.
pub fn indicators(ohlcv: &[Candle]) -> IndicatorSet {
    let mut set = IndicatorSet::new();
    let closes: Vec<f64> = ohlcv.iter().map(|c| c.close).collect();

    if let Some(rsi) = calculate_rsi(&closes, RSI_PERIOD) {
        set.insert("rsi".into(), IndicatorValue::Scalar(rsi));
    }

    if let Some(macd) = calculate_macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL) {
        set.insert(
            "macd".into(),
            IndicatorValue::List(vec![macd.line, macd.signal, macd.histogram]),
        );
    }

    for period in EMA_PERIODS {
        if let Some(ema) = calculate_ema(&closes, period) {
            set.insert(format!("ema_{period}"), IndicatorValue::Scalar(ema));
        }
    }
    for period in SMA_PERIODS {
        if let Some(sma) = calculate_sma(&closes, period) {
            set.insert(format!("sma_{period}"), IndicatorValue::Scalar(sma));
        }
    }

    if let Some(bands) = calculate_bollinger(&closes, BOLLINGER_PERIOD, BOLLINGER_STD_DEV) {
        set.insert(
            "bollinger".into(),
            IndicatorValue::List(vec![bands.upper, bands.middle, bands.lower]),
        );
    }

    if let Some(atr) = calculate_atr(ohlcv, ATR_PERIOD) {
        set.insert("atr".into(), IndicatorValue::Scalar(atr));
        // atr_percent is always recomputed here, never read back from a
        // cache — §4.2 is explicit that a stale atr_percent is a bug class.
        if let Some(last) = ohlcv.last() {
            if last.close > 0.0 {
                let atr_percent = atr / last.close * 100.0;
                set.insert("atr_percent".into(), IndicatorValue::Scalar(atr_percent));
            }
        }
    }

    if let Some((adx, plus_di, minus_di)) = calculate_adx(ohlcv, ADX_PERIOD) {
        set.insert("adx".into(), IndicatorValue::Scalar(adx));
        set.insert("plus_di".into(), IndicatorValue::Scalar(plus_di));
        set.insert("minus_di".into(), IndicatorValue::Scalar(minus_di));
    }

    if let Some(vwap) = calculate_vwap(ohlcv) {
        set.insert("vwap".into(), IndicatorValue::Scalar(vwap));
    }

    if let Some(obv) = calculate_obv(ohlcv) {
        set.insert("obv".into(), IndicatorValue::Scalar(obv));
    }

    set
}

/// Recent candlestick pattern tags as strings, for prompt payloads — kept
/// out of `IndicatorSet`/`IndicatorValue` since those are numeric-only and
/// a pattern name has no meaningful scalar or list-of-f64 form.
pub fn candlestick_pattern_names(ohlcv: &[Candle]) -> Vec<String> {
    detect_patterns(ohlcv).iter().map(|p| p.as_str().to_string()).collect()
}
