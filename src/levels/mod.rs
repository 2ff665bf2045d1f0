//! Level Extractor (§4.6): merges indicator-derived, structural, and MTF
//! price levels into deduplicated candidate supports/resistances, with a
//! mandatory ATR-multiple fallback so the generator is never starved.
use crate::models::{Candle, CandidateLevels, IndicatorSet, PriceStructure};
use std::collections::HashMap;

/// Mandatory fallback multiples (§4.6, bug #6): when every other source is
/// empty, `close ± k·ATR` for `k ∈ {1,2,3}` must still produce candidates —
/// the generator must always have at least 3 on each side.
const FALLBACK_ATR_MULTIPLES: [f64; 3] = [1.0, 2.0, 3.0];

fn push_dedup(list: &mut Vec<f64>, price: f64) {
    let exists = list
        .iter()
        .any(|&c| ((price - c).abs() / c.max(f64::EPSILON)) <= CandidateLevels::DEDUP_TOLERANCE);
    if !exists {
        list.push(price);
    }
}

/// Build candidate supports/resistances for one request (§4.6).
///
/// `mtf_levels` carries swing highs/lows harvested from other timeframes'
/// `PriceStructure` (already computed by the caller via the structure
/// summarizer), keyed by timeframe name — purely additional candidates,
/// not required.
pub fn extract(
    current_price: f64,
    structure: &PriceStructure,
    indicators: &IndicatorSet,
    mtf_levels: &HashMap<String, Vec<f64>>,
    atr: Option<f64>,
) -> CandidateLevels {
    let mut supports = Vec::new();
    let mut resistances = Vec::new();

    let mut candidate_prices: Vec<f64> = Vec::new();
    candidate_prices.extend(structure.swing_highs.iter().map(|s| s.price));
    candidate_prices.extend(structure.swing_lows.iter().map(|s| s.price));
    candidate_prices.push(structure.range_high);
    candidate_prices.push(structure.range_low);

    for key in ["ema_20", "ema_50", "ema_200", "vwap"] {
        if let Some(v) = indicators.get(key).and_then(|v| v.as_scalar()) {
            candidate_prices.push(v);
        }
    }
    if let Some(bollinger) = indicators.get("bollinger") {
        if let crate::models::IndicatorValue::List(bands) = bollinger {
            candidate_prices.extend(bands.iter().copied());
        }
    }
    for levels in mtf_levels.values() {
        candidate_prices.extend(levels.iter().copied());
    }

    for price in candidate_prices {
        if price <= 0.0 {
            continue;
        }
        if price < current_price {
            push_dedup(&mut supports, price);
        } else if price > current_price {
            push_dedup(&mut resistances, price);
        }
    }

    if supports.len() < 3 || resistances.len() < 3 {
        if let Some(atr) = atr {
            for k in FALLBACK_ATR_MULTIPLES {
                push_dedup(&mut supports, current_price - k * atr);
                push_dedup(&mut resistances, current_price + k * atr);
            }
        }
    }

    // Nearest first: supports descend toward current price, resistances
    // ascend away from it.
    supports.sort_by(|a, b| b.partial_cmp(a).unwrap());
    resistances.sort_by(|a, b| a.partial_cmp(b).unwrap());

    CandidateLevels {
        supports,
        resistances,
    }
}

/// Collect raw OHLCV-derived levels from a higher timeframe's candle
/// series for use as `mtf_levels` input: just the recent swing highs/lows
/// from that series' own high/low columns, without indicator computation.
pub fn mtf_levels_from_candles(candles: &[Candle], lookback: usize) -> Vec<f64> {
    let window = &candles[candles.len().saturating_sub(lookback)..];
    let mut levels = Vec::new();
    if let Some(high) = window.iter().map(|c| c.high).fold(None, |acc: Option<f64>, h| {
        Some(acc.map_or(h, |a: f64| a.max(h)))
    }) {
        levels.push(high);
    }
    if let Some(low) = window.iter().map(|c| c.low).fold(None, |acc: Option<f64>, l| {
        Some(acc.map_or(l, |a: f64| a.min(l)))
    }) {
        levels.push(low);
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SwingPoint, TrendState, VolatilityRegime};
    use std::collections::HashMap;

    fn empty_structure() -> PriceStructure {
        PriceStructure {
            swing_highs: Vec::new(),
            swing_lows: Vec::new(),
            range_high: 0.0,
            range_low: 0.0,
            range_size_pct: 0.0,
            current_position_in_range: 0.5,
            trend_state: HashMap::from([("4h".to_string(), TrendState::SidewaysWeak)]),
            volatility_regime: VolatilityRegime::Normal,
            distance_to_support_pct: 0.0,
            distance_to_resistance_pct: 0.0,
        }
    }

    #[test]
    fn fallback_fires_when_every_source_is_empty() {
        let structure = empty_structure();
        let levels = extract(100.0, &structure, &IndicatorSet::new(), &HashMap::new(), Some(2.0));
        assert!(levels.supports.len() >= 3);
        assert!(levels.resistances.len() >= 3);
    }

    #[test]
    fn fallback_is_skipped_when_sources_are_already_sufficient() {
        let mut structure = empty_structure();
        structure.swing_highs = vec![
            SwingPoint { price: 105.0, distance_pct: 5.0, idx: 10 },
            SwingPoint { price: 110.0, distance_pct: 10.0, idx: 20 },
            SwingPoint { price: 115.0, distance_pct: 15.0, idx: 30 },
        ];
        structure.swing_lows = vec![
            SwingPoint { price: 95.0, distance_pct: -5.0, idx: 10 },
            SwingPoint { price: 90.0, distance_pct: -10.0, idx: 20 },
            SwingPoint { price: 85.0, distance_pct: -15.0, idx: 30 },
        ];
        let levels = extract(100.0, &structure, &IndicatorSet::new(), &HashMap::new(), Some(2.0));
        assert_eq!(levels.supports.len(), 3);
        assert_eq!(levels.resistances.len(), 3);
        assert!(levels.supports[0] > levels.supports[1]); // nearest-first
    }

    #[test]
    fn dedup_drops_near_duplicates_within_tolerance() {
        let mut structure = empty_structure();
        structure.swing_highs = vec![
            SwingPoint { price: 105.0, distance_pct: 5.0, idx: 1 },
            SwingPoint { price: 105.05, distance_pct: 5.05, idx: 2 }, // ~0.05% away
        ];
        let levels = extract(100.0, &structure, &IndicatorSet::new(), &HashMap::new(), None);
        assert_eq!(levels.resistances.len(), 1);
    }
}
