//! LLM client contract (§4.7.1). The markdown-fence stripping is specific
//! to this client; the retry/backoff loop below it is grounded on the same
//! shape as `collectors::market_data::MarketDataClient::request_json` (in
//! turn grounded on the teacher's `CoinGeckoClient`) — bounded attempts,
//! exponential backoff on network errors/429/5xx, fail-fast on other 4xx.
//! This is a separate concern from the generator's own schema-repair retry
//! (§4.7), which resends a corrected prompt after a *successful* call came
//! back invalid; this loop only covers the call itself not completing.
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 2048;
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Mirrors §6's `generate(prompt_json, schema, temperature, seed?) -> json`.
/// The core pipeline depends only on this contract — the concrete model is
/// configuration, not a compile-time choice.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(
        &self,
        prompt_json: &Value,
        schema: &Value,
        temperature: f64,
        seed: Option<u64>,
    ) -> anyhow::Result<Value>;
}

pub struct OpenAiClient {
    api_key: String,
    client: reqwest::Client,
    model: String,
    max_retries: u32,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        OpenAiClient::with_max_retries(api_key, 3)
    }

    pub fn with_max_retries(api_key: String, max_retries: u32) -> Self {
        OpenAiClient {
            api_key,
            client: reqwest::Client::new(),
            model: DEFAULT_MODEL.to_string(),
            max_retries,
        }
    }

    fn strip_markdown_fence(text: &str) -> &str {
        let text = text.trim();
        if let Some(stripped) = text.strip_prefix("```json") {
            stripped.trim_end_matches("```").trim()
        } else if let Some(stripped) = text.strip_prefix("```") {
            stripped.trim_end_matches("```").trim()
        } else {
            text
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(
        &self,
        prompt_json: &Value,
        schema: &Value,
        temperature: f64,
        seed: Option<u64>,
    ) -> anyhow::Result<Value> {
        #[derive(serde::Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            max_tokens: u32,
            temperature: f64,
            seed: Option<u64>,
            messages: Vec<ChatMessage>,
        }
        #[derive(serde::Serialize)]
        struct ChatMessage {
            role: String,
            content: String,
        }
        #[derive(serde::Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }
        #[derive(serde::Deserialize)]
        struct Choice {
            message: ChoiceMessage,
        }
        #[derive(serde::Deserialize)]
        struct ChoiceMessage {
            content: String,
        }

        let system = format!(
            "Respond ONLY with strict JSON matching this schema, no markdown: {schema}"
        );
        let request = ChatRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature,
            seed,
            messages: vec![
                ChatMessage { role: "system".into(), content: system },
                ChatMessage { role: "user".into(), content: prompt_json.to_string() },
            ],
        };

        let mut response = None;
        for attempt in 0..self.max_retries {
            match self
                .client
                .post(OPENAI_CHAT_URL)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&request)
                .send()
                .await
            {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        response = Some(resp);
                        break;
                    }
                    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                        let wait = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .map(Duration::from_secs)
                            .unwrap_or_else(|| Duration::from_millis(INITIAL_BACKOFF_MS * 2u64.pow(attempt)));
                        tracing::warn!(%status, attempt, "LLM provider transient error, retrying in {wait:?}");
                        tokio::time::sleep(wait).await;
                        continue;
                    }
                    anyhow::bail!("LLM provider returned {status}");
                }
                Err(e) if attempt + 1 < self.max_retries => {
                    let wait = Duration::from_millis(INITIAL_BACKOFF_MS * 2u64.pow(attempt));
                    tracing::warn!(error = %e, attempt, "LLM request failed, retrying in {wait:?}");
                    tokio::time::sleep(wait).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
        let response = match response {
            Some(r) => r,
            None => anyhow::bail!("exhausted {} retries against LLM provider", self.max_retries),
        };

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or("");
        let stripped = Self::strip_markdown_fence(content);
        Ok(serde_json::from_str(stripped)?)
    }
}
