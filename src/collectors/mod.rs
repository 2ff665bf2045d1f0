//! Data Collectors (§4.1): one `collect(symbol, timeframe) -> CollectedData`
//! operation, fanning out to provider clients concurrently, each bounded by
//! its own timeout and retry policy. All the actual I/O in the engine lives
//! behind the `ProviderClient`/`SentimentClient` traits so the pipeline can
//! be exercised against fakes in tests.
pub mod market_data;
pub mod sentiment;

pub use market_data::{MarketDataClient, ProviderClient};
pub use sentiment::{SentimentClient, SentimentProvider};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::models::{Candle, CollectedData, FundingInfo, LiquidationEvent, SentimentInfo};
use crate::timeframe::Timeframe;
use std::collections::HashMap;
use std::sync::Arc;

/// Whitelist of symbols the engine will analyze (§4.1: "closed whitelist of
/// major USDT-perpetual pairs").
pub const SYMBOL_WHITELIST: &[&str] = &[
    "BTCUSDT", "ETHUSDT", "SOLUSDT", "BNBUSDT", "XRPUSDT", "DOGEUSDT", "ADAUSDT", "AVAXUSDT",
];

pub fn validate_symbol(symbol: &str) -> Result<(), EngineError> {
    if SYMBOL_WHITELIST.contains(&symbol) {
        Ok(())
    } else {
        Err(EngineError::InvalidInput {
            field: "symbol",
            reason: format!("{symbol} is not in the supported symbol whitelist"),
        })
    }
}

const MTF_TIMEFRAMES: [&str; 3] = ["1h", "4h", "1d"];

/// Fetch everything §4.1 enumerates for one request. Concurrent: all
/// independent fetches run in parallel via `tokio::join!`/`join_all`: a
/// failure in any non-primary source degrades gracefully (recorded as a
/// warning by the caller, via `DataQuality`) rather than failing the whole
/// collection — only a missing/too-short primary OHLCV is fatal.
pub async fn collect(
    market: &Arc<dyn ProviderClient>,
    sentiment: &Arc<dyn SentimentClient>,
    config: &EngineConfig,
    symbol: &str,
    timeframe: Timeframe,
) -> Result<(CollectedData, Vec<String>), EngineError> {
    let mut warnings = Vec::new();

    let primary_fut = market.get_klines(symbol, timeframe, config.primary_ohlcv_bars);
    let funding_fut = market.get_funding(symbol);
    let oi_fut = market.get_open_interest(symbol);
    let ls_fut = market.get_long_short_ratio(symbol);
    let liq_fut = market.get_liquidations(symbol, 24);
    let sentiment_fut = sentiment.get_fear_greed();

    let mtf_futs = futures::future::join_all(
        MTF_TIMEFRAMES
            .iter()
            .filter(|&&tf| tf != timeframe.as_str())
            .map(|&tf| async move {
                let parsed = Timeframe::parse(tf).expect("MTF_TIMEFRAMES entries are well-formed");
                let candles = market.get_klines(symbol, parsed, config.primary_ohlcv_bars).await;
                (tf.to_string(), candles)
            }),
    );

    let (primary, funding, open_interest, long_short_ratio, liquidations, sentiment_info, mtf_results) =
        tokio::join!(
            primary_fut,
            funding_fut,
            oi_fut,
            ls_fut,
            liq_fut,
            sentiment_fut,
            mtf_futs,
        );

    let primary_ohlcv: Vec<Candle> = match primary {
        Ok(candles) if candles.len() >= 50 => candles,
        Ok(candles) => {
            return Err(EngineError::InsufficientData {
                bars_found: candles.len(),
                bars_required: 50,
            })
        }
        Err(_) => {
            return Err(EngineError::InsufficientData {
                bars_found: 0,
                bars_required: 50,
            })
        }
    };

    if primary_ohlcv.len() < 100 {
        warnings.push("primary_ohlcv_below_100_bars".to_string());
    }

    let funding: Option<FundingInfo> = funding.ok().or_else(|| {
        warnings.push("funding_data_unavailable".to_string());
        None
    });
    let open_interest: Option<f64> = open_interest.ok().or_else(|| {
        warnings.push("open_interest_unavailable".to_string());
        None
    });
    let long_short_ratio: Option<f64> = long_short_ratio.ok().or_else(|| {
        warnings.push("long_short_ratio_unavailable".to_string());
        None
    });
    let liquidations: Option<Vec<LiquidationEvent>> = liquidations.ok().or_else(|| {
        warnings.push("liquidation_data_unavailable".to_string());
        None
    });
    let sentiment_info: Option<SentimentInfo> = sentiment_info.ok().or_else(|| {
        warnings.push("sentiment_data_unavailable".to_string());
        None
    });

    let mut mtf_ohlcv: HashMap<String, Vec<Candle>> = HashMap::new();
    mtf_ohlcv.insert(timeframe.as_str(), primary_ohlcv.clone());
    for (tf, result) in mtf_results {
        match result {
            Ok(candles) => {
                mtf_ohlcv.insert(tf, candles);
            }
            Err(_) => warnings.push(format!("mtf_{tf}_unavailable")),
        }
    }

    Ok((
        CollectedData {
            primary_ohlcv,
            mtf_ohlcv,
            funding,
            open_interest,
            long_short_ratio,
            liquidations,
            sentiment: sentiment_info,
        },
        warnings,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::market_data::tests::FakeMarketData;
    use crate::collectors::sentiment::tests::FakeSentiment;

    #[tokio::test]
    async fn collect_degrades_gracefully_when_liquidations_are_absent() {
        let market: Arc<dyn ProviderClient> = Arc::new(FakeMarketData::healthy_without_liquidations());
        let sentiment: Arc<dyn SentimentClient> = Arc::new(FakeSentiment::healthy());
        let config = EngineConfig::default();

        let (data, warnings) = collect(&market, &sentiment, &config, "BTCUSDT", Timeframe::H4)
            .await
            .unwrap();

        assert!(data.liquidations.is_none());
        assert!(warnings.contains(&"liquidation_data_unavailable".to_string()));
        assert!(!data.primary_ohlcv.is_empty());
    }

    #[tokio::test]
    async fn collect_fails_when_primary_ohlcv_is_too_short() {
        let market: Arc<dyn ProviderClient> = Arc::new(FakeMarketData::starved());
        let sentiment: Arc<dyn SentimentClient> = Arc::new(FakeSentiment::healthy());
        let config = EngineConfig::default();

        let result = collect(&market, &sentiment, &config, "BTCUSDT", Timeframe::H4).await;
        assert!(matches!(result, Err(EngineError::InsufficientData { .. })));
    }

    #[test]
    fn whitelist_rejects_unknown_symbols() {
        assert!(validate_symbol("BTCUSDT").is_ok());
        assert!(validate_symbol("NOTARONETOKEN").is_err());
    }
}
