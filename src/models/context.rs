//! Context Scorer data model (§3, §4.5).

use serde::{Deserialize, Serialize};

use super::LiqBias;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bias {
    Long,
    Short,
    Neutral,
}

impl Bias {
    /// Sign thresholds on `bias_score` (§4.5): `≥+2 → long`, `≤−2 → short`,
    /// else `neutral`. Invariant #5 (§8) requires the *sign* relationship to
    /// hold even if the thresholds widen beyond ±2 — `0` must always map to
    /// `Neutral`, positive always to `Long`, negative always to `Short`.
    pub fn from_score(score: i32) -> Self {
        if score >= 2 {
            Bias::Long
        } else if score <= -2 {
            Bias::Short
        } else {
            Bias::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Bias::Long => "long",
            Bias::Short => "short",
            Bias::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketContext {
    pub trend: String,
    pub bias: Bias,
    pub bias_score: i32,
    pub phase: String,
    pub sentiment: String,
    pub volatility: String,
    pub strength: f64,
    pub rsi: Option<f64>,
    pub funding_rate_pct: Option<f64>,
    pub long_short_ratio: Option<f64>,

    /// Liquidation Aggregator's directional pressure read (§4.4), carried
    /// through unchanged into the response so invariant #6 (§8) — the field
    /// must be present with the same shape whether or not liquidation data
    /// was actually available — holds at the response boundary, not just
    /// internally.
    pub liq_pressure_bias: LiqBias,
}
