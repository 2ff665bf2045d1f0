//! Context Scorer (§4.5): accumulates a signed integer `bias_score` from a
//! handful of independently-reasoned contributions, then derives `bias` and
//! `strength` from it. Pure, synchronous, and must be given the timeframe —
//! the dynamic sentiment weight cannot be computed without it.
use crate::models::{Bias, CollectedData, IndicatorSet, LiqBias, MarketContext, PriceStructure};
use crate::timeframe::Timeframe;

/// `base` sentiment weight (§6: `sentiment_base_weight`, default 1.0).
pub const SENTIMENT_BASE_WEIGHT: f64 = 1.0;

/// `trend_multiplier` on the sentiment contribution (§4.5): contrarian
/// reads are muted in a strong trend since fading it is riskier there.
fn trend_multiplier(adx: f64) -> f64 {
    if adx > 35.0 {
        0.5
    } else if adx > 25.0 {
        0.75
    } else {
        1.0
    }
}

/// Signed sentiment contribution before rounding: contrarian on the Fear &
/// Greed Index — extreme fear (low value) contributes bullishly (+), and
/// extreme greed contributes bearishly (−). Mirrors the RSI contribution's
/// two-tier magnitude (§4.5's `±1..±2` shape for reversion signals).
fn raw_sentiment_contribution(fear_greed_value: f64) -> f64 {
    if fear_greed_value <= 25.0 {
        2.0
    } else if fear_greed_value <= 35.0 {
        1.0
    } else if fear_greed_value >= 75.0 {
        -2.0
    } else if fear_greed_value >= 65.0 {
        -1.0
    } else {
        0.0
    }
}

/// Dynamically-weighted, rounded sentiment contribution (§4.5):
/// `round(raw · base · tf_multiplier · trend_multiplier)`.
pub fn sentiment_contribution(fear_greed_value: f64, timeframe: Timeframe, adx: f64) -> i32 {
    let raw = raw_sentiment_contribution(fear_greed_value);
    if raw == 0.0 {
        return 0;
    }
    let weight = SENTIMENT_BASE_WEIGHT * timeframe.sentiment_tf_multiplier() * trend_multiplier(adx);
    (raw * weight).round() as i32
}

/// Trend alignment (§4.5): EMA-stack strength on the request's own
/// timeframe, adjusted by concordance with the other collected MTF trend
/// readings. A strong trend with no MTF peers disagreeing keeps full ±3
/// conviction; any MTF divergence caps the contribution at ±1 regardless of
/// how strong the primary timeframe looks; full concordance across every
/// peer can lift an otherwise-weak primary trend from ±1 to ±2.
fn trend_alignment_contribution(structure: &PriceStructure, timeframe: Timeframe) -> i32 {
    let primary_key = timeframe.as_str();
    let Some(&primary) = structure.trend_state.get(&primary_key) else {
        return 0;
    };
    if !primary.is_bullish() && !primary.is_bearish() {
        return 0;
    }

    let peers: Vec<crate::models::TrendState> = structure
        .trend_state
        .iter()
        .filter(|(k, _)| k.as_str() != primary_key)
        .map(|(_, t)| *t)
        .collect();

    let agree = peers
        .iter()
        .filter(|t| (t.is_bullish() && primary.is_bullish()) || (t.is_bearish() && primary.is_bearish()))
        .count();
    let disagree = peers
        .iter()
        .filter(|t| (t.is_bullish() && primary.is_bearish()) || (t.is_bearish() && primary.is_bullish()))
        .count();
    let strong = matches!(primary, crate::models::TrendState::BullishStrong | crate::models::TrendState::BearishStrong);
    let fully_concordant = !peers.is_empty() && agree == peers.len();

    let magnitude = if disagree > agree {
        1
    } else if strong && (peers.is_empty() || fully_concordant) {
        3
    } else if strong || fully_concordant {
        2
    } else {
        1
    };

    if primary.is_bullish() {
        magnitude
    } else {
        -magnitude
    }
}

fn rsi_contribution(rsi: Option<f64>) -> i32 {
    match rsi {
        Some(v) if v <= 30.0 => 2,
        Some(v) if v <= 40.0 => 1,
        Some(v) if v >= 70.0 => -2,
        Some(v) if v >= 60.0 => -1,
        _ => 0,
    }
}

/// Funding extremes are counter-trend: an overheated positive funding rate
/// (longs paying shorts heavily) leans bearish, and symmetrically.
fn funding_contribution(funding_rate_pct: Option<f64>) -> i32 {
    match funding_rate_pct {
        Some(v) if v > 0.05 => -1,
        Some(v) if v < -0.05 => 1,
        _ => 0,
    }
}

/// Long/short ratio extremes are also counter-trend (crowded positioning
/// tends to unwind).
fn long_short_contribution(ratio: Option<f64>) -> i32 {
    match ratio {
        Some(v) if v >= 2.0 => -1,
        Some(v) if v <= 0.5 => 1,
        _ => 0,
    }
}

fn liquidation_contribution(liq_bias: LiqBias, trend_bullish: bool, trend_bearish: bool) -> i32 {
    match liq_bias {
        LiqBias::Long if trend_bullish => 1,
        LiqBias::Short if trend_bearish => -1,
        _ => 0,
    }
}

/// Build the `MarketContext` for one timeframe (§4.5).
pub fn score(
    data: &CollectedData,
    structure: &PriceStructure,
    indicators: &IndicatorSet,
    liq_bias: LiqBias,
    timeframe: Timeframe,
) -> MarketContext {
    let rsi = indicators.get("rsi").and_then(|v| v.as_scalar());
    let adx = indicators.get("adx").and_then(|v| v.as_scalar()).unwrap_or(0.0);
    // FundingInfo.rate is a fraction (e.g. 0.0003 == 0.03%/8h); the scorer
    // and the wire-facing context both work in percent.
    let funding_rate_pct = data.funding.as_ref().map(|f| f.rate * 100.0);
    let long_short_ratio = data.long_short_ratio;

    let trend = structure
        .trend_state
        .get(&timeframe.as_str())
        .copied()
        .unwrap_or(crate::models::TrendState::SidewaysWeak);

    let sentiment_score = data
        .sentiment
        .as_ref()
        .map(|s| sentiment_contribution(s.value as f64, timeframe, adx))
        .unwrap_or(0);

    let bias_score = trend_alignment_contribution(structure, timeframe)
        + rsi_contribution(rsi)
        + funding_contribution(funding_rate_pct)
        + long_short_contribution(long_short_ratio)
        + sentiment_score
        + liquidation_contribution(liq_bias, trend.is_bullish(), trend.is_bearish());

    let bias = Bias::from_score(bias_score);
    let strength = (bias_score.unsigned_abs() as f64 / 6.0).min(1.0);

    MarketContext {
        trend: trend.as_str().to_string(),
        bias,
        bias_score,
        phase: structure.volatility_regime.as_str().to_string(),
        sentiment: data
            .sentiment
            .as_ref()
            .map(|s| s.classification.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        volatility: structure.volatility_regime.as_str().to_string(),
        strength,
        rsi,
        funding_rate_pct,
        long_short_ratio,
        liq_pressure_bias: liq_bias,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_contribution_is_smaller_at_higher_adx_and_shorter_timeframe() {
        // Invariant #9 (§8): identical F&G reading, 1h@ADX40 must be
        // strictly smaller in magnitude than 1d@ADX20.
        let short_tf = sentiment_contribution(20.0, Timeframe::H1, 40.0);
        let long_tf = sentiment_contribution(20.0, Timeframe::D1, 20.0);
        assert!(short_tf.abs() < long_tf.abs(), "{short_tf} vs {long_tf}");
    }

    #[test]
    fn s2_bullish_scenario_sentiment_contribution_is_two() {
        // S2: 4h request, ADX=32 (>25 => 0.75 multiplier), F&G=25 (deep
        // fear, contrarian raw magnitude 2). round(2*1.5*0.75) = 2, not 3.
        let contribution = sentiment_contribution(25.0, Timeframe::H4, 32.0);
        assert_eq!(contribution, 2);
    }

    #[test]
    fn neutral_funding_and_ratio_contribute_nothing() {
        assert_eq!(funding_contribution(Some(0.01)), 0);
        assert_eq!(long_short_contribution(Some(1.0)), 0);
    }
}
