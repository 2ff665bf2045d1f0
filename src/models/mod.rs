//! Core data model (§3). All entities are in-memory, request-scoped, and
//! serializable — nothing here is persisted or shared mutably across
//! requests.

pub mod collected;
pub mod context;
pub mod levels;
pub mod liquidation;
pub mod quality;
pub mod response;
pub mod scenario;
pub mod structure;

pub use collected::{CollectedData, FundingInfo, SentimentInfo};
pub use context::{Bias, MarketContext};
pub use levels::CandidateLevels;
pub use liquidation::{Intensity, LiquidationClusters, LiquidationEvent, LiqBias, SpikeMagnitude};
pub use quality::DataQuality;
pub use response::AnalysisResponse;
pub use scenario::{Entry, Invalidation, Leverage, OrderType, Scenario, StopLoss, Target, Why};
pub use structure::{PriceStructure, SwingPoint, TrendState, VolatilityRegime};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    pub ts: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Mapping from indicator name to scalar or short list of scalars at the
/// latest bar (§3). A `HashMap` rather than a fixed struct because the
/// scenario generator serializes this directly into the compact JSON prompt
/// and new indicators should not require touching every consumer.
pub type IndicatorSet = HashMap<String, IndicatorValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndicatorValue {
    Scalar(f64),
    List(Vec<f64>),
}

impl IndicatorValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            IndicatorValue::Scalar(v) => Some(*v),
            IndicatorValue::List(v) => v.first().copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::series_from_closes;

    #[test]
    fn candle_series_has_monotonic_timestamps() {
        let series = series_from_closes(&[100.0, 101.0, 102.0]);
        for w in series.windows(2) {
            assert!(w[1].ts > w[0].ts);
        }
    }

    #[test]
    fn indicator_value_as_scalar() {
        assert_eq!(IndicatorValue::Scalar(1.5).as_scalar(), Some(1.5));
        assert_eq!(
            IndicatorValue::List(vec![2.0, 3.0]).as_scalar(),
            Some(2.0)
        );
    }
}
