//! Scenario data model (§3). The LLM emits the pre-adapter fields; the
//! Scenario Adapter (§4.8) fills in the `Adapter-added` fields afterward.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Bias;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    LimitOrder,
    MarketOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub price_min: f64,
    pub price_max: f64,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub reason: String,
}

impl Entry {
    pub fn mid(&self) -> f64 {
        (self.price_min + self.price_max) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopLoss {
    pub conservative: f64,
    pub aggressive: f64,
    pub recommended: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub level: u8,
    pub price: f64,
    pub partial_close_pct: f64,
    pub rr: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leverage {
    pub recommended: String,
    pub max_safe: String,
    pub volatility_adjusted: bool,
    pub atr_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invalidation {
    pub price: f64,
    pub condition: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Why {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bullish_factors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearish_factors: Option<Vec<String>>,
    pub risks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: Uuid,
    pub name: String,
    pub bias: Bias,
    pub confidence: f64,
    pub entry: Entry,
    pub stop_loss: StopLoss,
    pub targets: Vec<Target>,
    pub leverage: Leverage,
    pub invalidation: Invalidation,
    pub why: Why,
    pub conditions: Vec<String>,

    // Adapter-added fields (§3), absent until the Scenario Adapter runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_pct_of_entry: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atr_multiple_stop: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_valid_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_trigger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_trade_conditions: Option<Vec<String>>,
}

impl Scenario {
    /// Price ordering invariant (§3, invariant #1): for `long`,
    /// `stop < entry.min <= entry.max < t1 < t2 < t3`; for `short`, strict
    /// reverse. Returns `false` for `Neutral` scenarios, which carry no
    /// directional ordering to check — callers should not emit `Neutral`
    /// scenarios into the final response in the first place.
    pub fn price_ordering_holds(&self) -> bool {
        if self.targets.len() < 3 {
            return false;
        }
        let stop = self.stop_loss.recommended;
        let emin = self.entry.price_min;
        let emax = self.entry.price_max;
        let t: Vec<f64> = self.targets.iter().map(|t| t.price).collect();
        match self.bias {
            Bias::Long => stop < emin && emin <= emax && emax < t[0] && t[0] < t[1] && t[1] < t[2],
            Bias::Short => {
                stop > emin && emin >= emax && emax > t[0] && t[0] > t[1] && t[1] > t[2]
            }
            Bias::Neutral => false,
        }
    }

    /// Invalidation invariant (§3): `invalidation.price` sits on the
    /// opposite side of entry from the targets, and strictly tighter
    /// (closer to entry) than the worst-case `stop_loss.conservative`.
    /// `Neutral` carries no directional ordering to check.
    pub fn invalidation_ordering_holds(&self) -> bool {
        match self.bias {
            Bias::Long => {
                self.invalidation.price < self.entry.price_min
                    && self.invalidation.price > self.stop_loss.conservative
            }
            Bias::Short => {
                self.invalidation.price > self.entry.price_max
                    && self.invalidation.price < self.stop_loss.conservative
            }
            Bias::Neutral => false,
        }
    }
}
