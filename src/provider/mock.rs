//! Scripted provider for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::error::ProviderError;
use super::{ChatOutcome, ChatProvider, ChatTurn};

/// Replays a queue of scripted replies in order. An exhausted queue
/// yields [`ProviderError::MockExhausted`], which lets tests exercise the
/// per-candidate exclusion path.
pub struct MockProvider {
    responses: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
    model: String,
}

impl MockProvider {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            model: model.into(),
        }
    }

    pub fn with_responses<I, S>(model: impl Into<String>, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new(model);
        for response in responses {
            provider.push_response(response);
        }
        provider
    }

    pub fn push_response(&self, response: impl Into<String>) {
        self.responses
            .lock()
            .expect("mock response queue poisoned")
            .push_back(response.into());
    }

    /// Number of chat calls made so far (including exhausted ones).
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider")
            .field("model", &self.model)
            .field("calls", &self.call_count())
            .finish()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn chat(
        &self,
        _turns: &[ChatTurn],
        _temperature: f64,
    ) -> Result<ChatOutcome, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let next = self
            .responses
            .lock()
            .expect("mock response queue poisoned")
            .pop_front();

        match next {
            Some(text) => Ok(ChatOutcome {
                text,
                latency_s: 0.0,
                tokens_in: Some(10),
                tokens_out: Some(10),
            }),
            None => Err(ProviderError::MockExhausted),
        }
    }

    fn provider_id(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
