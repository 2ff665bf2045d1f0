//! Typed engine errors (§7).
//!
//! `EngineError` is the engine's own error type; plumbing code (config
//! loading, CLI wiring, provider client construction) keeps using the
//! looser [`crate::Result`] alias, matching the split the rest of this
//! codebase draws between domain errors and glue errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {field} — {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("insufficient primary OHLCV data: found {bars_found} bars, need at least {bars_required}")]
    InsufficientData {
        bars_found: usize,
        bars_required: usize,
    },

    #[error("provider {source} failed transiently: {cause}")]
    ProviderTransient {
        source: String,
        #[source]
        cause: anyhow::Error,
    },

    #[error("provider {source} rate limited us; retry after {retry_after_s:?}s")]
    RateLimited {
        source: String,
        retry_after_s: Option<u64>,
    },

    #[error("LLM structured output failed schema validation after retry: {details}")]
    LlmValidationFailure { details: String },

    #[error("request deadline of {deadline_s}s exceeded")]
    Timeout { deadline_s: u64 },

    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Maps a terminal error kind to the HTTP status named in §6/§7. Only
    /// the kinds that can actually escape `analyze_symbol` as `Err` need a
    /// mapping — `PartialData`/`ProviderTransient`/`RateLimited` are
    /// recovered locally inside the pipeline and never surface here.
    pub fn status_code(&self) -> u16 {
        match self {
            EngineError::InvalidInput { .. } => 400,
            EngineError::InsufficientData { .. } => 422,
            EngineError::Timeout { .. } => 504,
            EngineError::ProviderTransient { .. } | EngineError::RateLimited { .. } => 500,
            EngineError::LlmValidationFailure { .. } => 500,
            EngineError::Internal(_) => 500,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidInput { .. } => "invalid_input",
            EngineError::InsufficientData { .. } => "insufficient_data",
            EngineError::ProviderTransient { .. } => "provider_transient",
            EngineError::RateLimited { .. } => "rate_limited",
            EngineError::LlmValidationFailure { .. } => "llm_validation_failure",
            EngineError::Timeout { .. } => "timeout",
            EngineError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_spec_table() {
        assert_eq!(
            EngineError::InvalidInput {
                field: "symbol",
                reason: "not in whitelist".into()
            }
            .status_code(),
            400
        );
        assert_eq!(
            EngineError::InsufficientData {
                bars_found: 10,
                bars_required: 50
            }
            .status_code(),
            422
        );
        assert_eq!(EngineError::Timeout { deadline_s: 30 }.status_code(), 504);
        assert_eq!(EngineError::Internal("oops".into()).status_code(), 500);
    }
}
