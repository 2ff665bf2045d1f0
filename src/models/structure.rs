//! Price-Structure Summarizer data model (§3, §4.3).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A swing high or low point. `idx` is the index into the OHLCV series this
/// swing was found in — swing arrays must be ordered by increasing `idx`
/// (bug #2: recency, never magnitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwingPoint {
    pub price: f64,
    pub distance_pct: f64,
    pub idx: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendState {
    BullishStrong,
    BullishWeak,
    BearishStrong,
    BearishWeak,
    SidewaysWeak,
}

impl TrendState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendState::BullishStrong => "bullish_strong",
            TrendState::BullishWeak => "bullish_weak",
            TrendState::BearishStrong => "bearish_strong",
            TrendState::BearishWeak => "bearish_weak",
            TrendState::SidewaysWeak => "sideways_weak",
        }
    }

    pub fn is_bullish(&self) -> bool {
        matches!(self, TrendState::BullishStrong | TrendState::BullishWeak)
    }

    pub fn is_bearish(&self) -> bool {
        matches!(self, TrendState::BearishStrong | TrendState::BearishWeak)
    }
}

/// Volatility regime thresholds on `atr_percent` (§3): `<0.8`, `<1.5`,
/// `<2.5`, `≥2.5`. `VeryLow` must be reachable — bug #1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityRegime {
    VeryLow,
    Compression,
    Normal,
    Expansion,
}

impl VolatilityRegime {
    pub fn from_atr_percent(atr_percent: f64) -> Self {
        if atr_percent < 0.8 {
            VolatilityRegime::VeryLow
        } else if atr_percent < 1.5 {
            VolatilityRegime::Compression
        } else if atr_percent < 2.5 {
            VolatilityRegime::Normal
        } else {
            VolatilityRegime::Expansion
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VolatilityRegime::VeryLow => "very_low",
            VolatilityRegime::Compression => "compression",
            VolatilityRegime::Normal => "normal",
            VolatilityRegime::Expansion => "expansion",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceStructure {
    pub swing_highs: Vec<SwingPoint>,
    pub swing_lows: Vec<SwingPoint>,
    pub range_high: f64,
    pub range_low: f64,
    pub range_size_pct: f64,
    pub current_position_in_range: f64,
    /// Timeframe name -> trend state. Single-timeframe callers populate one
    /// entry keyed by the request's own timeframe; MTF callers may add more.
    pub trend_state: HashMap<String, TrendState>,
    pub volatility_regime: VolatilityRegime,
    pub distance_to_support_pct: f64,
    pub distance_to_resistance_pct: f64,
}
