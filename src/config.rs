//! `EngineConfig` (§6): a single struct carrying every enumerated default
//! plus the ambient additions from §2.1/§6, loaded once per process via the
//! `config` crate layered over `dotenvy`, and passed down by reference —
//! never re-read mid-request, so a request's behavior is a pure function of
//! the snapshot it started with.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub market_data_rpm: u32,
    pub sentiment_rpm: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig {
            market_data_rpm: 1200,
            sentiment_rpm: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_scenarios_default: usize,
    pub primary_ohlcv_bars: usize,
    pub lookback_intraday: usize,
    pub lookback_daily: usize,
    pub swing_min_separation: usize,
    pub liq_bin_pct: f64,
    pub sentiment_base_weight: f64,
    pub llm_temperature: f64,
    pub request_deadline_s: u64,
    pub rate_limit: RateLimitConfig,
    pub cache_ttl_s: u64,

    // Ambient additions (§2.1, §6).
    pub llm_concurrency: usize,
    pub llm_acquire_timeout_s: u64,
    pub provider_timeout_s: u64,
    pub provider_max_retries: u32,
    pub llm_max_retries: u32,
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_scenarios_default: 3,
            primary_ohlcv_bars: 200,
            lookback_intraday: 50,
            lookback_daily: 30,
            swing_min_separation: 5,
            liq_bin_pct: 0.005,
            sentiment_base_weight: 1.0,
            llm_temperature: 0.2,
            request_deadline_s: 30,
            rate_limit: RateLimitConfig::default(),
            cache_ttl_s: 60,
            llm_concurrency: 8,
            llm_acquire_timeout_s: 5,
            provider_timeout_s: 10,
            provider_max_retries: 3,
            llm_max_retries: 3,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Layered load (§2.1): code defaults → optional `config/default.toml`
    /// → environment overrides prefixed `ENGINE__`, `__` as the nested-field
    /// separator (e.g. `ENGINE__RATE_LIMIT__SENTIMENT_RPM=10`). Reads a
    /// `.env` file first via `dotenvy`, matching the teacher's local-dev
    /// convenience, without requiring one to exist.
    pub fn load() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            .add_source(config::Config::try_from(&EngineConfig::default())?)
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("ENGINE").separator("__"));

        let settings = builder.build()?;
        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.max_scenarios_default, 3);
        assert_eq!(cfg.primary_ohlcv_bars, 200);
        assert_eq!(cfg.lookback_intraday, 50);
        assert_eq!(cfg.lookback_daily, 30);
        assert_eq!(cfg.swing_min_separation, 5);
        assert!((cfg.liq_bin_pct - 0.005).abs() < 1e-12);
        assert_eq!(cfg.request_deadline_s, 30);
        assert_eq!(cfg.cache_ttl_s, 60);
        assert_eq!(cfg.llm_concurrency, 8);
        assert_eq!(cfg.llm_acquire_timeout_s, 5);
        assert_eq!(cfg.provider_timeout_s, 10);
        assert_eq!(cfg.provider_max_retries, 3);
        assert_eq!(cfg.llm_max_retries, 3);
        assert_eq!(cfg.log_level, "info");
    }
}
