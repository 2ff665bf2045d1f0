//! Top-level orchestrator (§5): wires the pipeline stages in their fixed
//! order — collect → structure → aggregate → score → extract → generate →
//! adapt → assess — behind a single `analyze_symbol` entry point, the whole
//! thing wrapped in one request deadline.
use crate::adapter;
use crate::collectors::{self, ProviderClient, SentimentClient};
use crate::config::EngineConfig;
use crate::context;
use crate::error::EngineError;
use crate::generator::{self, LlmScenario};
use crate::indicators;
use crate::levels;
use crate::liquidation;
use crate::llm::LlmClient;
use crate::models::AnalysisResponse;
use crate::quality;
use crate::structure;
use crate::timeframe::Timeframe;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Everything the pipeline needs across requests, built once per process and
/// shared behind `Arc` — never a global static, so tests can construct an
/// independent `EngineState` per case.
pub struct EngineState {
    pub market: Arc<dyn ProviderClient>,
    pub sentiment: Arc<dyn SentimentClient>,
    pub llm: Arc<dyn LlmClient>,
    pub llm_semaphore: Arc<Semaphore>,
    pub config: EngineConfig,
}

impl EngineState {
    pub fn new(
        market: Arc<dyn ProviderClient>,
        sentiment: Arc<dyn SentimentClient>,
        llm: Arc<dyn LlmClient>,
        config: EngineConfig,
    ) -> Self {
        let llm_semaphore = Arc::new(Semaphore::new(config.llm_concurrency));
        EngineState {
            market,
            sentiment,
            llm,
            llm_semaphore,
            config,
        }
    }
}

/// Validate request inputs before any fetch: whitelisted symbol, parseable
/// timeframe, `max_scenarios` clamped to `[1,5]` (§4).
fn validate_request(symbol: &str, timeframe: &str, max_scenarios: usize) -> Result<(Timeframe, usize), EngineError> {
    collectors::validate_symbol(symbol)?;
    let parsed = Timeframe::parse(timeframe).ok_or_else(|| EngineError::InvalidInput {
        field: "timeframe",
        reason: format!("{timeframe} is not a recognized timeframe"),
    })?;
    Ok((parsed, max_scenarios.clamp(1, 5)))
}

/// Run the full pipeline for one `(symbol, timeframe)` request.
pub async fn analyze_symbol(
    state: &EngineState,
    symbol: &str,
    timeframe: &str,
    max_scenarios: usize,
) -> Result<AnalysisResponse, EngineError> {
    let deadline = tokio::time::Duration::from_secs(state.config.request_deadline_s);
    tokio::time::timeout(deadline, run_pipeline(state, symbol, timeframe, max_scenarios))
        .await
        .map_err(|_| EngineError::Timeout {
            deadline_s: state.config.request_deadline_s,
        })?
}

async fn run_pipeline(
    state: &EngineState,
    symbol: &str,
    timeframe: &str,
    max_scenarios: usize,
) -> Result<AnalysisResponse, EngineError> {
    let (tf, max_scenarios) = validate_request(symbol, timeframe, max_scenarios)?;

    let (data, mut warnings) =
        collectors::collect(&state.market, &state.sentiment, &state.config, symbol, tf).await?;

    let current_price = data
        .primary_ohlcv
        .last()
        .map(|c| c.close)
        .ok_or_else(|| EngineError::InsufficientData {
            bars_found: 0,
            bars_required: 50,
        })?;

    let indicator_set = indicators::indicators(&data.primary_ohlcv);

    let mut structure = structure::summarize(&data.primary_ohlcv, tf, &indicator_set, current_price)
        .ok_or_else(|| EngineError::InsufficientData {
            bars_found: data.primary_ohlcv.len(),
            bars_required: 50,
        })?;

    // Populate trend_state for every other collected MTF timeframe so the
    // Context Scorer can weigh concordance/divergence across them (§4.5),
    // not just the request's own timeframe.
    for (key, candles) in data.mtf_ohlcv.iter().filter(|(key, _)| key.as_str() != tf.as_str()) {
        if let Some(trend) = structure::trend_for(candles) {
            structure.trend_state.insert(key.clone(), trend);
        }
    }

    let liquidation_clusters = match &data.liquidations {
        Some(events) => liquidation::aggregate(events, current_price, 24.0),
        None => crate::models::LiquidationClusters::empty(),
    };

    let context = context::score(
        &data,
        &structure,
        &indicator_set,
        liquidation_clusters.liq_pressure_bias,
        tf,
    );

    let atr = indicator_set.get("atr").and_then(|v| v.as_scalar());
    let atr_percent = indicator_set.get("atr_percent").and_then(|v| v.as_scalar()).unwrap_or(0.0);

    let mtf_levels: HashMap<String, Vec<f64>> = data
        .mtf_ohlcv
        .iter()
        .filter(|(key, _)| key.as_str() != tf.as_str())
        .map(|(key, candles)| (key.clone(), levels::mtf_levels_from_candles(candles, 50)))
        .collect();

    let candidate_levels = levels::extract(current_price, &structure, &indicator_set, &mtf_levels, atr);

    let candlestick_patterns = indicators::candlestick_pattern_names(&data.primary_ohlcv);
    let market_data = generator::build_market_data(
        symbol,
        &tf.as_str(),
        current_price,
        &context,
        &structure,
        &candidate_levels,
        &liquidation_clusters,
        &indicator_set,
        &candlestick_patterns,
    );

    let llm_scenarios: Vec<LlmScenario> = generator::generate_scenarios(
        &state.llm,
        state.llm_semaphore.as_ref(),
        tokio::time::Duration::from_secs(state.config.llm_acquire_timeout_s),
        &market_data,
        max_scenarios,
        state.config.llm_temperature,
        None,
    )
    .await?;

    if llm_scenarios.is_empty() {
        warnings.push("llm_generation_failed".to_string());
    }

    let adapted: Vec<_> = llm_scenarios
        .into_iter()
        .filter_map(|raw| adapter::adapt(raw, tf, atr_percent, &context))
        .collect();
    let on_levels = adapter::drop_scenarios_off_candidate_levels(adapted, &candidate_levels);
    let (scenarios, diversity_warnings) = adapter::apply_diversity_and_truncate(on_levels, max_scenarios);
    warnings.extend(diversity_warnings);

    let data_quality = quality::assess(&data, &warnings);

    Ok(AnalysisResponse {
        success: true,
        symbol: symbol.to_string(),
        timeframe: tf.as_str(),
        analysis_timestamp: Utc::now(),
        current_price,
        market_context: context,
        scenarios,
        key_levels: candidate_levels,
        data_quality,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::market_data::tests::FakeMarketData;
    use crate::collectors::sentiment::tests::FakeSentiment;
    use crate::llm::tests::FakeLlmClient;
    use serde_json::json;

    fn valid_llm_response(n: usize) -> serde_json::Value {
        let scenario = json!({
            "name": "breakout long",
            "bias": "long",
            "confidence": 0.7,
            "entry": {"priceMin": 100.0, "priceMax": 101.0, "type": "limit_order", "reason": "support"},
            "stopLoss": {"conservative": 97.0, "aggressive": 98.0, "recommended": 98.0, "reason": "below support"},
            "targets": [
                {"level": 1, "price": 105.0, "partialClosePct": 30.0, "rr": 2.0, "reason": "r1"},
                {"level": 2, "price": 108.0, "partialClosePct": 40.0, "rr": 3.0, "reason": "r2"},
                {"level": 3, "price": 112.0, "partialClosePct": 30.0, "rr": 4.0, "reason": "r3"}
            ],
            "invalidation": {"price": 96.0, "condition": "close below 96"},
            "why": {"bullishFactors": ["trend"], "risks": ["funding flip"]},
            "conditions": ["RSI reclaim 50"]
        });
        json!({ "scenarios": vec![scenario; n] })
    }

    fn fake_state(llm_responses: Vec<serde_json::Value>) -> EngineState {
        let market: Arc<dyn ProviderClient> = Arc::new(FakeMarketData::healthy_without_liquidations());
        let sentiment: Arc<dyn SentimentClient> = Arc::new(FakeSentiment::healthy());
        let llm: Arc<dyn LlmClient> = Arc::new(FakeLlmClient::new(llm_responses));
        EngineState::new(market, sentiment, llm, EngineConfig::default())
    }

    #[tokio::test]
    async fn rejects_symbols_outside_the_whitelist() {
        let state = fake_state(vec![valid_llm_response(3)]);
        let result = analyze_symbol(&state, "NOTAREALCOIN", "4h", 3).await;
        assert!(matches!(result, Err(EngineError::InvalidInput { .. })));
    }

    #[tokio::test]
    async fn rejects_unparseable_timeframe() {
        let state = fake_state(vec![valid_llm_response(3)]);
        let result = analyze_symbol(&state, "BTCUSDT", "banana", 3).await;
        assert!(matches!(result, Err(EngineError::InvalidInput { .. })));
    }

    #[tokio::test]
    async fn full_pipeline_produces_a_response_with_scenarios() {
        let state = fake_state(vec![valid_llm_response(3)]);
        let response = analyze_symbol(&state, "BTCUSDT", "4h", 3).await.unwrap();
        assert!(response.success);
        assert_eq!(response.symbol, "BTCUSDT");
        assert!(!response.scenarios.is_empty());
        assert!(response.data_quality.completeness > 0.0);
    }

    #[tokio::test]
    async fn soft_llm_failure_still_returns_a_response_with_empty_scenarios() {
        let state = fake_state(vec![json!({"garbage": true}), json!({"garbage": true})]);
        let response = analyze_symbol(&state, "BTCUSDT", "4h", 3).await.unwrap();
        assert!(response.success);
        assert!(response.scenarios.is_empty());
        assert!(response.data_quality.warnings.contains(&"llm_generation_failed".to_string()));
    }
}
