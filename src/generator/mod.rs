//! Scenario Generator (§4.7): builds a compact JSON market-state object and
//! asks the LLM for up to `max(max_scenarios, 3)` diverse scenarios, each
//! selecting its prices from the candidate set. The LLM call is the only
//! suspension point in this component.
use crate::llm::LlmClient;
use crate::models::{
    Bias, CandidateLevels, Entry, Invalidation, LiquidationClusters, MarketContext, PriceStructure,
    StopLoss, Target, Why,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Duration;

/// Intermediate shape the LLM is asked to emit: everything in `Scenario`
/// except `id` and the Adapter-added fields (§4.8 fills those in). Leverage
/// is deliberately absent — the adapter computes it from ATR, never the LLM.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmScenario {
    pub name: String,
    pub bias: Bias,
    pub confidence: f64,
    pub entry: Entry,
    pub stop_loss: StopLoss,
    pub targets: Vec<Target>,
    pub invalidation: Invalidation,
    pub why: Why,
    pub conditions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LlmResponseBody {
    scenarios: Vec<LlmScenario>,
}

fn response_schema() -> Value {
    json!({
        "type": "object",
        "required": ["scenarios"],
        "properties": {
            "scenarios": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name", "bias", "confidence", "entry", "stopLoss", "targets", "invalidation", "why", "conditions"],
                    "properties": {
                        "bias": {"enum": ["long", "short", "neutral"]},
                        "confidence": {"type": "number", "minimum": 0, "maximum": 1},
                        "targets": {"type": "array", "minItems": 3, "maxItems": 3}
                    }
                }
            }
        }
    })
}

/// Compact `market_data` object (§4.7): current price, context, structure,
/// candidate levels, liquidation clusters, key indicators, timeframe. Input
/// is JSON, not prose — the data *is* the prompt.
pub fn build_market_data(
    symbol: &str,
    timeframe: &str,
    current_price: f64,
    context: &MarketContext,
    structure: &PriceStructure,
    levels: &CandidateLevels,
    liquidation: &LiquidationClusters,
    indicators: &crate::models::IndicatorSet,
    candlestick_patterns: &[String],
) -> Value {
    json!({
        "symbol": symbol,
        "timeframe": timeframe,
        "current_price": current_price,
        "context": context,
        "structure": structure,
        "supports": levels.supports,
        "resistances": levels.resistances,
        "liquidation": liquidation,
        "indicators": indicators,
        "candlestick_patterns": candlestick_patterns,
        "rule": "Use only prices from supports/resistances/swing_*/ema_*/vwap; do not invent.",
    })
}

/// Request `max(max_scenarios, 3)` diverse scenarios from the LLM. Schema
/// validation failure triggers exactly one retry with a repair instruction
/// appended to the prompt (§4.7); a second failure is a soft-failure:
/// empty scenarios plus a warning, never an `Err`.
pub async fn generate_scenarios(
    llm: &Arc<dyn LlmClient>,
    semaphore: &Semaphore,
    acquire_timeout: Duration,
    market_data: &Value,
    max_scenarios: usize,
    temperature: f64,
    seed: Option<u64>,
) -> Result<Vec<LlmScenario>, crate::error::EngineError> {
    let k = max_scenarios.max(3);
    let schema = response_schema();

    let _permit = tokio::time::timeout(acquire_timeout, semaphore.acquire())
        .await
        .map_err(|_| crate::error::EngineError::RateLimited {
            source: "llm".to_string(),
            retry_after_s: Some(acquire_timeout.as_secs()),
        })?
        .map_err(|_| crate::error::EngineError::Internal("llm semaphore closed".to_string()))?;

    let prompt = json!({
        "instruction": format!("Produce exactly {k} diverse trading scenarios as JSON: {{\"scenarios\": [...]}}"),
        "market_data": market_data,
    });

    match try_generate(llm, &prompt, &schema, temperature, seed).await {
        Ok(scenarios) => Ok(scenarios),
        Err(first_err) => {
            let repair_prompt = json!({
                "instruction": format!(
                    "Your previous response failed schema validation: {first_err}. Produce exactly {k} diverse trading scenarios as strict JSON matching the schema, with no extra commentary: {{\"scenarios\": [...]}}"
                ),
                "market_data": market_data,
            });
            match try_generate(llm, &repair_prompt, &schema, temperature, seed).await {
                Ok(scenarios) => Ok(scenarios),
                Err(_second_err) => Ok(Vec::new()),
            }
        }
    }
}

async fn try_generate(
    llm: &Arc<dyn LlmClient>,
    prompt: &Value,
    schema: &Value,
    temperature: f64,
    seed: Option<u64>,
) -> anyhow::Result<Vec<LlmScenario>> {
    let raw = llm.generate(prompt, schema, temperature, seed).await?;
    let body: LlmResponseBody = serde_json::from_value(raw)?;
    Ok(body.scenarios)
}
