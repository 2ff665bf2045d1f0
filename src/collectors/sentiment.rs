//! Sentiment provider client (§4.1.1, §6): a single cacheable endpoint,
//! `get_fear_greed`, following the same retry/backoff shape as
//! `MarketDataClient` but against a much smaller surface.
use crate::config::EngineConfig;
use crate::models::{SentimentClassification, SentimentInfo};
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use moka::future::Cache;
use reqwest::Client;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

type SentimentRateLimiter =
    RateLimiter<governor::state::direct::NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>;

const INITIAL_BACKOFF_MS: u64 = 500;

#[async_trait]
pub trait SentimentClient: Send + Sync {
    async fn get_fear_greed(&self) -> anyhow::Result<SentimentInfo>;
}

pub struct SentimentProvider {
    client: Client,
    base_url: String,
    rate_limiter: Arc<SentimentRateLimiter>,
    cache: Cache<(), SentimentInfo>,
    max_retries: u32,
}

impl SentimentProvider {
    pub fn new(base_url: String, config: &EngineConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.provider_timeout_s))
            .build()?;
        let quota =
            Quota::per_minute(NonZeroU32::new(config.rate_limit.sentiment_rpm).unwrap_or(NonZeroU32::new(30).unwrap()));

        Ok(SentimentProvider {
            client,
            base_url,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            cache: Cache::builder()
                .time_to_live(Duration::from_secs(config.cache_ttl_s))
                .build(),
            max_retries: config.provider_max_retries,
        })
    }
}

#[async_trait]
impl SentimentClient for SentimentProvider {
    async fn get_fear_greed(&self) -> anyhow::Result<SentimentInfo> {
        if let Some(cached) = self.cache.get(&()).await {
            return Ok(cached);
        }

        #[derive(serde::Deserialize)]
        struct RawFearGreed {
            value: u8,
        }

        let url = format!("{}/fear-greed", self.base_url);
        let mut raw: Option<RawFearGreed> = None;

        for attempt in 0..self.max_retries {
            self.rate_limiter.until_ready().await;
            match self.client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    raw = Some(response.json().await?);
                    break;
                }
                Ok(response) if response.status().is_server_error() => {
                    let wait = Duration::from_millis(INITIAL_BACKOFF_MS * 2u64.pow(attempt));
                    tracing::warn!(attempt, "sentiment provider 5xx, retrying in {wait:?}");
                    tokio::time::sleep(wait).await;
                }
                Ok(response) => anyhow::bail!("sentiment provider returned {}", response.status()),
                Err(e) if attempt + 1 < self.max_retries => {
                    let wait = Duration::from_millis(INITIAL_BACKOFF_MS * 2u64.pow(attempt));
                    tracing::warn!(error = %e, attempt, "sentiment network error, retrying in {wait:?}");
                    tokio::time::sleep(wait).await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        let raw = raw.ok_or_else(|| anyhow::anyhow!("exhausted retries against sentiment provider"))?;
        let info = SentimentInfo {
            value: raw.value,
            classification: SentimentClassification::from_value(raw.value),
        };
        self.cache.insert((), info).await;
        Ok(info)
    }
}
