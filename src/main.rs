//! Thin CLI demo around the engine crate (§2.1): wires config + logging and
//! exposes a one-shot `analyze` subcommand. Not part of the engine's public
//! contract — persists nothing, holds no state across invocations.
use clap::{Parser, Subcommand};
use scenario_engine::collectors::{MarketDataClient, SentimentProvider};
use scenario_engine::config::EngineConfig;
use scenario_engine::llm::OpenAiClient;
use scenario_engine::{analyze_symbol, EngineState, Result};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "scenario-engine")]
#[command(about = "Futures trading scenario engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one analysis for a symbol/timeframe and print the response as JSON.
    Analyze {
        /// Futures symbol, e.g. BTCUSDT.
        symbol: String,

        /// Candle timeframe, e.g. 4h, 1d.
        #[arg(short, long, default_value = "4h")]
        timeframe: String,

        /// Maximum number of scenarios to request (clamped to [1,5]).
        #[arg(short, long, default_value = "3")]
        max_scenarios: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = EngineConfig::load()?;
    scenario_engine::init_tracing(&config.log_level);

    let Cli { command } = Cli::parse();
    match command {
        Commands::Analyze {
            symbol,
            timeframe,
            max_scenarios,
        } => run_analyze(config, &symbol, &timeframe, max_scenarios).await,
    }
}

async fn run_analyze(config: EngineConfig, symbol: &str, timeframe: &str, max_scenarios: usize) -> Result<()> {
    let market_base_url =
        std::env::var("MARKET_DATA_BASE_URL").unwrap_or_else(|_| "https://fapi.example.com".to_string());
    let market_auth_token = std::env::var("MARKET_DATA_AUTH_TOKEN").ok();
    let sentiment_base_url =
        std::env::var("SENTIMENT_BASE_URL").unwrap_or_else(|_| "https://api.alternative.me".to_string());
    let openai_api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not found in environment");

    let market = Arc::new(MarketDataClient::new(market_base_url, market_auth_token, &config)?);
    let sentiment = Arc::new(SentimentProvider::new(sentiment_base_url, &config)?);
    let llm = Arc::new(OpenAiClient::with_max_retries(openai_api_key, config.llm_max_retries));

    let state = EngineState::new(market, sentiment, llm, config);

    let response = analyze_symbol(&state, symbol, timeframe, max_scenarios).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
