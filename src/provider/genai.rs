//! Multi-provider adapter backed by the `genai` client.
//!
//! `genai` routes by model name (e.g. `gpt-4o-mini` → OpenAI) and reads
//! provider API keys from the environment, so this adapter carries no
//! credential handling of its own.

use std::time::Instant;

use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};

use super::error::ProviderError;
use super::{ChatOutcome, ChatProvider, ChatTurn, Role};

pub struct GenAiProvider {
    client: Client,
    model: String,
}

impl GenAiProvider {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::default(),
            model: model.into(),
        }
    }
}

impl std::fmt::Debug for GenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAiProvider")
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl ChatProvider for GenAiProvider {
    async fn chat(
        &self,
        turns: &[ChatTurn],
        temperature: f64,
    ) -> Result<ChatOutcome, ProviderError> {
        let messages: Vec<ChatMessage> = turns
            .iter()
            .map(|turn| match turn.role {
                Role::System => ChatMessage::system(turn.content.clone()),
                Role::User => ChatMessage::user(turn.content.clone()),
            })
            .collect();

        let request = ChatRequest::new(messages);
        let options = ChatOptions::default().with_temperature(temperature);

        let start = Instant::now();
        let response = self
            .client
            .exec_chat(&self.model, request, Some(&options))
            .await
            .map_err(|e| ProviderError::RequestFailed {
                provider: "genai".to_string(),
                reason: e.to_string(),
            })?;
        let latency_s = start.elapsed().as_secs_f64();

        let text = response.first_text().unwrap_or_default().to_string();
        if text.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        let usage = response.usage;

        Ok(ChatOutcome {
            text,
            latency_s,
            tokens_in: usage.prompt_tokens.and_then(|v| u64::try_from(v).ok()),
            tokens_out: usage.completion_tokens.and_then(|v| u64::try_from(v).ok()),
        })
    }

    fn provider_id(&self) -> &'static str {
        "genai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
