//! Futures Trading Scenario Engine: fetches market data for a perpetual
//! futures symbol, derives structure/context/levels, and asks an LLM for
//! candidate trading scenarios grounded in that data. See `SPEC_FULL.md` for
//! the full module contract.
pub mod adapter;
pub mod collectors;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod generator;
pub mod indicators;
pub mod levels;
pub mod liquidation;
pub mod llm;
pub mod models;
pub mod quality;
pub mod structure;
pub mod timeframe;

#[cfg(test)]
mod test_support;

pub use engine::{analyze_symbol, EngineState};
pub use error::EngineError;

/// Glue-code error alias for plumbing (config loading, CLI wiring, provider
/// client construction) that isn't part of the domain error surface —
/// `EngineError` is reserved for the pipeline itself (§7).
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Initialize structured logging (§2.1), read from `EngineConfig::log_level`
/// so the level is configuration, not a compile-time choice.
pub fn init_tracing(log_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(format!("scenario_engine={log_level}"))
        .init();
}
