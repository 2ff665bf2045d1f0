//! Data Collectors output model (§3, §4.1).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Candle, LiquidationEvent};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingInfo {
    pub rate: f64,
    pub next_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentInfo {
    pub value: u8,
    pub classification: SentimentClassification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentClassification {
    ExtremeFear,
    Fear,
    Neutral,
    Greed,
    ExtremeGreed,
}

impl SentimentClassification {
    pub fn from_value(value: u8) -> Self {
        match value {
            0..=24 => SentimentClassification::ExtremeFear,
            25..=44 => SentimentClassification::Fear,
            45..=55 => SentimentClassification::Neutral,
            56..=75 => SentimentClassification::Greed,
            _ => SentimentClassification::ExtremeGreed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentClassification::ExtremeFear => "extreme_fear",
            SentimentClassification::Fear => "fear",
            SentimentClassification::Neutral => "neutral",
            SentimentClassification::Greed => "greed",
            SentimentClassification::ExtremeGreed => "extreme_greed",
        }
    }
}

/// Everything the Data Collectors component (§4.1) gathers for one request.
/// Non-primary fields are `None` when the corresponding source failed or was
/// unavailable (e.g. liquidations without authenticated credentials) — the
/// Quality Assessor reads the `None`s to compute `completeness`/`warnings`.
#[derive(Debug, Clone, Default)]
pub struct CollectedData {
    pub primary_ohlcv: Vec<Candle>,
    /// MTF OHLCV keyed by timeframe string (`"1h"`, `"4h"`, `"1d"`).
    pub mtf_ohlcv: HashMap<String, Vec<Candle>>,
    pub funding: Option<FundingInfo>,
    pub open_interest: Option<f64>,
    pub long_short_ratio: Option<f64>,
    pub liquidations: Option<Vec<LiquidationEvent>>,
    pub sentiment: Option<SentimentInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_classification_buckets() {
        assert_eq!(
            SentimentClassification::from_value(10),
            SentimentClassification::ExtremeFear
        );
        assert_eq!(
            SentimentClassification::from_value(25),
            SentimentClassification::Fear
        );
        assert_eq!(
            SentimentClassification::from_value(50),
            SentimentClassification::Neutral
        );
        assert_eq!(
            SentimentClassification::from_value(90),
            SentimentClassification::ExtremeGreed
        );
    }
}
