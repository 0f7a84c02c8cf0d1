//! Raw OpenAI-compatible HTTP adapter.
//!
//! Targets serverless endpoints that speak the OpenAI chat-completions
//! wire shape (Together and friends) without pulling in a provider SDK.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::ProviderError;
use super::{ChatOutcome, ChatProvider, ChatTurn};

pub struct OpenAiCompatProvider {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiCompatProvider {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key,
            model: model.into(),
        })
    }
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f64,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireReply,
}

#[derive(Deserialize)]
struct WireReply {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: Option<u64>,
    #[serde(default)]
    completion_tokens: Option<u64>,
}

#[async_trait]
impl ChatProvider for OpenAiCompatProvider {
    async fn chat(
        &self,
        turns: &[ChatTurn],
        temperature: f64,
    ) -> Result<ChatOutcome, ProviderError> {
        let body = WireRequest {
            model: &self.model,
            messages: turns
                .iter()
                .map(|t| WireMessage {
                    role: t.role.as_str(),
                    content: &t.content,
                })
                .collect(),
            temperature,
        };

        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let start = Instant::now();
        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ProviderError::RequestFailed {
                provider: "openai-compat".to_string(),
                reason: e.to_string(),
            })?;

        let parsed: WireResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::RequestFailed {
                    provider: "openai-compat".to_string(),
                    reason: format!("invalid response body: {e}"),
                })?;
        let latency_s = start.elapsed().as_secs_f64();

        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(ProviderError::EmptyResponse)?;

        let (tokens_in, tokens_out) = parsed
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((None, None));

        Ok(ChatOutcome {
            text,
            latency_s,
            tokens_in,
            tokens_out,
        })
    }

    fn provider_id(&self) -> &'static str {
        "openai-compat"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
