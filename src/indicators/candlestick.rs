/// Recent candlestick pattern tags (§2, Indicator Engine responsibility).
/// Detection is deliberately conservative — each pattern is checked against
/// the last one or two bars only, matching "recent candlestick patterns" in
/// scope rather than a full historical pattern scan.
use crate::models::Candle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandlePattern {
    BullishEngulfing,
    BearishEngulfing,
    Doji,
    Hammer,
    ShootingStar,
}

impl CandlePattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandlePattern::BullishEngulfing => "bullish_engulfing",
            CandlePattern::BearishEngulfing => "bearish_engulfing",
            CandlePattern::Doji => "doji",
            CandlePattern::Hammer => "hammer",
            CandlePattern::ShootingStar => "shooting_star",
        }
    }
}

/// Detect patterns present at the last bar of `candles`. A bar can match
/// more than one pattern (e.g. a doji that's also a hammer by wick shape).
pub fn detect_patterns(candles: &[Candle]) -> Vec<CandlePattern> {
    let mut found = Vec::new();
    let Some(last) = candles.last() else {
        return found;
    };

    let body = (last.close - last.open).abs();
    let range = last.high - last.low;
    if range <= 0.0 {
        return found;
    }

    if body / range < 0.1 {
        found.push(CandlePattern::Doji);
    }

    let upper_wick = last.high - last.open.max(last.close);
    let lower_wick = last.open.min(last.close) - last.low;

    if lower_wick > body * 2.0 && upper_wick < body {
        found.push(CandlePattern::Hammer);
    }
    if upper_wick > body * 2.0 && lower_wick < body {
        found.push(CandlePattern::ShootingStar);
    }

    if candles.len() >= 2 {
        let prev = &candles[candles.len() - 2];
        let prev_bearish = prev.close < prev.open;
        let prev_bullish = prev.close > prev.open;
        let curr_bullish = last.close > last.open;
        let curr_bearish = last.close < last.open;

        if prev_bearish
            && curr_bullish
            && last.open <= prev.close
            && last.close >= prev.open
        {
            found.push(CandlePattern::BullishEngulfing);
        }
        if prev_bullish
            && curr_bearish
            && last.open >= prev.close
            && last.close <= prev.open
        {
            found.push(CandlePattern::BearishEngulfing);
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::series_from_ohlc;

    #[test]
    fn detects_bullish_engulfing() {
        let candles = series_from_ohlc(&[
            (105.0, 106.0, 99.0, 100.0), // bearish
            (99.0, 107.0, 98.0, 106.0),  // bullish, engulfs prior body
        ]);
        let patterns = detect_patterns(&candles);
        assert!(patterns.contains(&CandlePattern::BullishEngulfing));
    }

    #[test]
    fn detects_doji() {
        let candles = series_from_ohlc(&[(100.0, 105.0, 95.0, 100.05)]);
        let patterns = detect_patterns(&candles);
        assert!(patterns.contains(&CandlePattern::Doji));
    }

    #[test]
    fn empty_series_has_no_patterns() {
        assert!(detect_patterns(&[]).is_empty());
    }
}
