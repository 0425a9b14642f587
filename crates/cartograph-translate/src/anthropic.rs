use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use cartograph_core::error::{CartographError, Result};
use cartograph_core::language::LanguageService;
use cartograph_core::AppConfig;

// ---------------------------------------------------------------------------
// Anthropic Messages API types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const MAX_TOKENS: u32 = 1024;
/// Hard ceiling for a single HTTP exchange; callers apply their own, shorter timeout.
const HTTP_TIMEOUT_SECS: u64 = 60;

/// `LanguageService` backed by the Anthropic Messages API.
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl AnthropicClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key: config.anthropic_api_key.clone(),
            model: config.anthropic_model.clone(),
            endpoint: ANTHROPIC_API_URL.to_string(),
        })
    }

    /// Points the client at a different Messages endpoint (proxies, tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[async_trait]
impl LanguageService for AnthropicClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        if !self.is_configured() {
            return Err(CartographError::ClassificationUnavailable(
                "ANTHROPIC_API_KEY is not set".into(),
            ));
        }

        let request = AnthropicRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
            system,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "sending request to Anthropic API");

        let resp = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                CartographError::ClassificationUnavailable(format!(
                    "HTTP request to Anthropic failed: {e}"
                ))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".into());
            return Err(CartographError::ClassificationUnavailable(format!(
                "Anthropic API returned {status}: {body}"
            )));
        }

        let api_resp: AnthropicResponse = resp.json().await.map_err(|e| {
            CartographError::MalformedClassifierResponse(format!(
                "failed to parse Anthropic response: {e}"
            ))
        })?;

        let text = api_resp
            .content
            .into_iter()
            .filter(|b| b.block_type == "text")
            .map(|b| b.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(CartographError::MalformedClassifierResponse(
                "Anthropic returned an empty response".into(),
            ));
        }

        debug!(
            stop_reason = ?api_resp.stop_reason,
            response_len = text.len(),
            "received Anthropic API response"
        );

        Ok(text)
    }
}
