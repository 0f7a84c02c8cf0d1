//! Judge collaborator.
//!
//! Asks a judge model whether a candidate's final answer is correct and
//! parses its JSON verdict. Parsing is deliberately lenient: a judge that
//! returns garbage produces a reject verdict with zero confidence rather
//! than an error, so one bad reply never takes down a question.


use std::sync::Arc;

use async_trait::async_trait;

use crate::provider::{ChatProvider, ChatTurn, ProviderError};
use crate::record::{Candidate, CandidateVerdict, VerdictLabel};

/// Response-format instruction appended to every judge prompt.
pub const JUDGE_FORMAT_INSTRUCTION: &str =
    r#"Return JSON: {"label":"accept|reject","confidence":0.xx,"rationale":"..."}"#;

const JUDGE_SYSTEM_PROMPT: &str = "You judge if a final answer is correct.";

/// Capability interface: judge one candidate for one question.
#[async_trait]
pub trait Judge: Send + Sync {
    async fn judge(
        &self,
        question: &str,
        candidate: &Candidate,
    ) -> Result<CandidateVerdict, ProviderError>;
}

/// Builds the judge prompt for a candidate answer.
pub fn judge_turns(question: &str, answer: &str, cot: &str) -> Vec<ChatTurn> {
    vec![
        ChatTurn::system(JUDGE_SYSTEM_PROMPT),
        ChatTurn::user(format!(
            "Question: {question}\nFinal answer: {answer}\nSteps (may be empty):\n{cot}\n{JUDGE_FORMAT_INSTRUCTION}"
        )),
    ]
}

/// Judge backed by any [`ChatProvider`], always called at temperature 0.
pub struct LlmJudge {
    provider: Arc<dyn ChatProvider>,
}

impl LlmJudge {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Judge for LlmJudge {
    async fn judge(
        &self,
        question: &str,
        candidate: &Candidate,
    ) -> Result<CandidateVerdict, ProviderError> {
        let turns = judge_turns(question, &candidate.answer, &candidate.cot);
        let outcome = self.provider.chat(&turns, 0.0).await?;
        Ok(parse_verdict(&outcome.text, outcome.latency_rounded()))
    }
}

#[derive(serde::Deserialize)]
struct RawVerdict {
    #[serde(default)]
    label: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    rationale: String,
}

/// Parses a judge reply into a verdict. Never fails: an unparsable reply
/// degrades to `reject` with zero confidence and the parse failure as
/// rationale. Confidence is clamped to [0, 1].
pub fn parse_verdict(raw: &str, latency_s: f64) -> CandidateVerdict {
    match try_parse(raw) {
        Ok((label, confidence, rationale)) => CandidateVerdict {
            label,
            confidence,
            rationale,
            latency_s,
        },
        Err(reason) => CandidateVerdict {
            label: VerdictLabel::Reject,
            confidence: 0.0,
            rationale: format!("invalid judge response: {reason}"),
            latency_s,
        },
    }
}

fn try_parse(raw: &str) -> Result<(VerdictLabel, f64, String), String> {
    let body = strip_code_fence(raw.trim());
    let parsed: RawVerdict = serde_json::from_str(body).map_err(|e| e.to_string())?;

    let label = match parsed.label.trim().to_lowercase().as_str() {
        "accept" => VerdictLabel::Accept,
        "reject" => VerdictLabel::Reject,
        other => return Err(format!("invalid label: {other:?}")),
    };

    let confidence = if parsed.confidence.is_finite() {
        parsed.confidence.clamp(0.0, 1.0)
    } else {
        0.0
    };

    Ok((label, confidence, parsed.rationale))
}

/// Judge models occasionally wrap the JSON in a markdown code fence.
fn strip_code_fence(s: &str) -> &str {
    let Some(inner) = s.strip_prefix("```") else {
        return s;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}
