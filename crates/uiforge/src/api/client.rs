//! HTTP client for the OpenRouter chat-completions endpoint.

use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use super::retry::RetryConfig;
use super::wire::{ChatCompletion, ChatRequest, decode_completion};
use crate::OPENROUTER_URL;

/// Async client for OpenRouter.
///
/// Transient failures are retried here according to [`RetryConfig`]; the
/// default is no retries.
pub struct OpenRouterClient {
    http: reqwest::Client,
    api_key: String,
    referer: String,
    title: String,
    retry: RetryConfig,
}

impl OpenRouterClient {
    /// Client with the default attribution headers.
    pub fn new(api_key: impl Into<String>) -> Result<Self, String> {
        Self::with_headers(api_key, "https://github.com/uiforge/uiforge", "uiforge")
    }

    /// Client with custom `HTTP-Referer` and `X-Title` headers.
    pub fn with_headers(
        api_key: impl Into<String>,
        referer: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<Self, String> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("uiforge/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            referer: referer.into(),
            title: title.into(),
            retry: RetryConfig::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    /// Send `body`, retrying transient failures.
    pub async fn chat(&self, body: &ChatRequest) -> Result<ChatCompletion, String> {
        let mut attempt = 0;
        loop {
            match self.post(body).await {
                Ok(completion) => return Ok(completion),
                Err(e) if self.retry.should_retry(attempt, &e) => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(
                        "Transient LLM error (attempt {}/{}), retrying in {:.1}s: {e}",
                        attempt + 1,
                        self.retry.max_retries,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One HTTP round trip.
    async fn post(&self, body: &ChatRequest) -> Result<ChatCompletion, String> {
        debug!(
            "LLM request: model={}, messages={}, max_tokens={}, temp={:?}, structured={}",
            body.model,
            body.messages.len(),
            body.max_tokens,
            body.temperature,
            body.response_format.is_some(),
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );
        let started = Instant::now();

        let response = self
            .http
            .post(OPENROUTER_URL)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| format!("failed to read response: {e}"))?;
        debug!(
            "LLM response: HTTP {status} in {:.1}s ({} bytes)",
            started.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(format!("OpenRouter API HTTP {status}: {text}"));
        }
        decode_completion(&text)
    }
}
