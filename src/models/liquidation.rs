//! Liquidation Aggregator data model (§3, §4.4).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single liquidation event, as returned by `get_liquidations` (§6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidationEvent {
    pub price: f64,
    pub side: LiquidationSide,
    pub qty: f64,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiquidationSide {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

impl Intensity {
    /// `>1M` high, `>500k` medium, else low (§4.4).
    pub fn from_volume_usd(volume_usd: f64) -> Self {
        if volume_usd > 1_000_000.0 {
            Intensity::High
        } else if volume_usd > 500_000.0 {
            Intensity::Medium
        } else {
            Intensity::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpikeMagnitude {
    Low,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiqBias {
    Long,
    Short,
    Neutral,
}

impl LiqBias {
    pub fn as_str(&self) -> &'static str {
        match self {
            LiqBias::Long => "long",
            LiqBias::Short => "short",
            LiqBias::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidationBin {
    pub price: f64,
    pub intensity: Intensity,
    pub volume_usd: f64,
}

/// Emitted on both the present-data and absent-data paths with the same
/// field shape (bug #8): when the source is absent, `clusters_above`/
/// `clusters_below` are empty and `liq_pressure_bias` is `Neutral`, never a
/// differently-named or differently-shaped record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidationClusters {
    pub clusters_above: Vec<LiquidationBin>,
    pub clusters_below: Vec<LiquidationBin>,
    pub last_24h_liq_spike: bool,
    pub spike_magnitude: SpikeMagnitude,
    pub liq_pressure_bias: LiqBias,
}

impl LiquidationClusters {
    pub fn empty() -> Self {
        LiquidationClusters {
            clusters_above: Vec::new(),
            clusters_below: Vec::new(),
            last_24h_liq_spike: false,
            spike_magnitude: SpikeMagnitude::Low,
            liq_pressure_bias: LiqBias::Neutral,
        }
    }
}
