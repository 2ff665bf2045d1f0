//! Response envelope (§3, §6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CandidateLevels, DataQuality, MarketContext, Scenario};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub success: bool,
    pub symbol: String,
    pub timeframe: String,
    pub analysis_timestamp: DateTime<Utc>,
    pub current_price: f64,
    pub market_context: MarketContext,
    pub scenarios: Vec<Scenario>,
    pub key_levels: CandidateLevels,
    pub data_quality: DataQuality,
}
