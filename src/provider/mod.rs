//! Chat provider capability interface.
//!
//! Generation and judging both reduce to "send chat turns, get text
//! back", so a single [`ChatProvider`] trait is the seam between the
//! pipeline and any model API. Adapters:
//!
//! - [`GenAiProvider`] — multi-provider client via `genai` (OpenAI,
//!   Anthropic, Gemini, ... routed by model name).
//! - [`OpenAiCompatProvider`] — raw OpenAI-compatible HTTP endpoint
//!   (Together-style serverless inference).
//! - `MockProvider` — scripted responses, behind
//!   `#[cfg(any(test, feature = "mock"))]`.

pub mod error;
pub mod genai;
pub mod openai_compat;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::ProviderError;
pub use openai_compat::OpenAiCompatProvider;
pub use self::genai::GenAiProvider;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockProvider;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{Config, ProviderKind};

/// Message role in a chat exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

impl Role {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

/// One turn of a chat prompt.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Result of one chat call.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub text: String,
    pub latency_s: f64,
    pub tokens_in: Option<u64>,
    pub tokens_out: Option<u64>,
}

impl ChatOutcome {
    /// Latency rounded to milliseconds, the precision persisted in
    /// records.
    #[inline]
    pub fn latency_rounded(&self) -> f64 {
        (self.latency_s * 1000.0).round() / 1000.0
    }
}

/// Capability interface over a chat model.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Sends the turns and returns the model's reply.
    async fn chat(&self, turns: &[ChatTurn], temperature: f64) -> Result<ChatOutcome, ProviderError>;

    /// Stable adapter identifier, recorded in run provenance.
    fn provider_id(&self) -> &'static str;

    /// Model name this provider targets.
    fn model(&self) -> &str;
}

/// Builds the configured provider for `model`.
pub fn build_provider(
    kind: ProviderKind,
    model: &str,
    config: &Config,
) -> Result<Arc<dyn ChatProvider>, ProviderError> {
    match kind {
        ProviderKind::GenAi => Ok(Arc::new(GenAiProvider::new(model))),
        ProviderKind::OpenAiCompat => Ok(Arc::new(OpenAiCompatProvider::new(
            &config.openai_compat_url,
            config.api_key.clone(),
            model,
            Duration::from_secs(config.request_timeout_secs),
        )?)),
    }
}
