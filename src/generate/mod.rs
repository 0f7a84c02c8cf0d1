//! Generation collaborator.
//!
//! Produces k candidate chain-of-thought answers per question. The model
//! is instructed to end with `Final: <answer>`; the extractor falls back
//! to the full reply when the marker is missing so a candidate always has
//! an answer string (possibly a wrong one — that is the judge's problem).

use std::sync::Arc;

use tracing::debug;

use crate::provider::{ChatProvider, ChatTurn, ProviderError};
use crate::record::{Candidate, GenerationBlock, GenerationRecord, GeneratorInfo, Question};

const GENERATOR_SYSTEM_PROMPT: &str =
    "You are a careful problem solver. Show steps briefly and end with 'Final: <answer>'.";

const FINAL_MARKER: &str = "Final:";

/// Builds the solve prompt for a question.
pub fn generation_turns(question: &str) -> Vec<ChatTurn> {
    vec![
        ChatTurn::system(GENERATOR_SYSTEM_PROMPT),
        ChatTurn::user(format!(
            "Question: {question}\nSolve step by step. Conclude with 'Final: <answer>'."
        )),
    ]
}

/// Extracts the final answer from a reply: the remainder of the first
/// `Final:` line, or the whole trimmed reply when the marker is absent.
pub fn extract_final_answer(text: &str) -> String {
    if let Some(idx) = text.find(FINAL_MARKER) {
        let rest = &text[idx + FINAL_MARKER.len()..];
        let answer = rest.lines().next().unwrap_or("").trim();
        if !answer.is_empty() {
            return answer.to_string();
        }
    }
    text.trim().to_string()
}

/// Sampling temperature: deterministic for a single sample, diverse for
/// multi-sample runs.
pub fn temperature_for(n_samples: usize) -> f64 {
    if n_samples > 1 { 0.7 } else { 0.0 }
}

/// Generates candidate answers via a [`ChatProvider`].
pub struct CotGenerator {
    provider: Arc<dyn ChatProvider>,
    n_samples: usize,
}

impl CotGenerator {
    /// `n_samples` is clamped to at least 1.
    pub fn new(provider: Arc<dyn ChatProvider>, n_samples: usize) -> Self {
        Self {
            provider,
            n_samples: n_samples.max(1),
        }
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Generates all candidates for one question.
    ///
    /// Samples are drawn sequentially from the provider; cross-question
    /// concurrency is the pipeline's job.
    pub async fn generate(&self, question: &Question) -> Result<GenerationRecord, ProviderError> {
        let turns = generation_turns(&question.question);
        let temperature = temperature_for(self.n_samples);

        let mut candidates = Vec::with_capacity(self.n_samples);
        for sample in 0..self.n_samples {
            let outcome = self.provider.chat(&turns, temperature).await?;
            let answer = extract_final_answer(&outcome.text);

            debug!(
                id = %question.id,
                sample,
                answer = %answer,
                "candidate generated"
            );

            candidates.push(Candidate {
                cot: outcome.text.clone(),
                answer,
                latency_s: outcome.latency_rounded(),
                tokens_in: outcome.tokens_in,
                tokens_out: outcome.tokens_out,
            });
        }

        let generation =
            GenerationBlock::from_candidates(candidates).ok_or(ProviderError::EmptyResponse)?;

        Ok(GenerationRecord {
            question: question.clone(),
            generator: Some(GeneratorInfo {
                provider: self.provider.provider_id().to_string(),
                model: self.provider.model().to_string(),
                temperature,
                n_samples: self.n_samples,
            }),
            generation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockProvider;
    use crate::record::Domain;

    fn sample_question() -> Question {
        Question {
            id: "gsm8k/pilot/0".into(),
            domain: Domain::Math,
            dataset: "gsm8k".into(),
            split: "pilot".into(),
            question: "What is 2+2?".into(),
            reference_answer: "4".into(),
            gold_cot: None,
            metadata: None,
        }
    }

    #[test]
    fn test_extract_final_answer_from_marker() {
        assert_eq!(extract_final_answer("Step 1: add.\nFinal: 4"), "4");
        assert_eq!(extract_final_answer("Final:   72  "), "72");
        assert_eq!(extract_final_answer("Final: 4\nExtra commentary"), "4");
    }

    #[test]
    fn test_extract_final_answer_without_marker_uses_full_text() {
        assert_eq!(extract_final_answer("  just an answer  "), "just an answer");
        assert_eq!(extract_final_answer(""), "");
    }

    #[test]
    fn test_extract_final_answer_empty_marker_line_falls_back() {
        assert_eq!(extract_final_answer("Final:\nnothing on that line"),
            "Final:\nnothing on that line");
    }

    #[test]
    fn test_temperature_policy() {
        assert_eq!(temperature_for(1), 0.0);
        assert_eq!(temperature_for(5), 0.7);
        assert_eq!(temperature_for(0), 0.0);
    }

    #[tokio::test]
    async fn test_generate_single_sample() {
        let provider = Arc::new(MockProvider::with_responses(
            "mock-gen",
            ["2 + 2 = 4\nFinal: 4"],
        ));
        let generator = CotGenerator::new(provider, 1);

        let record = generator.generate(&sample_question()).await.unwrap();
        assert_eq!(record.generation.candidates.len(), 1);
        assert_eq!(record.generation.answer, "4");
        assert_eq!(record.generation.cot, "2 + 2 = 4\nFinal: 4");

        let info = record.generator.unwrap();
        assert_eq!(info.provider, "mock");
        assert_eq!(info.n_samples, 1);
        assert_eq!(info.temperature, 0.0);
    }

    #[tokio::test]
    async fn test_generate_multi_sample_keeps_first_as_alias() {
        let provider = Arc::new(MockProvider::with_responses(
            "mock-gen",
            ["Final: 4", "Final: 5", "Final: 4"],
        ));
        let generator = CotGenerator::new(provider, 3);

        let record = generator.generate(&sample_question()).await.unwrap();
        assert_eq!(record.generation.candidates.len(), 3);
        assert_eq!(record.generation.answer, "4");
        assert_eq!(record.generation.candidates[1].answer, "5");
        assert_eq!(record.generator.unwrap().temperature, 0.7);
    }

    #[tokio::test]
    async fn test_generate_propagates_provider_failure() {
        let provider = Arc::new(MockProvider::with_responses("mock-gen", ["Final: 4"]));
        let generator = CotGenerator::new(provider, 3);

        // Second sample hits the exhausted queue.
        let result = generator.generate(&sample_question()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_samples_clamped_to_one() {
        let provider = Arc::new(MockProvider::new("mock-gen"));
        let generator = CotGenerator::new(provider, 0);
        assert_eq!(generator.n_samples(), 1);
    }
}
