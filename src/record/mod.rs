//! Record types for the evaluation pipeline.
//!
//! Every stage of a run communicates through JSONL files of these shapes:
//! [`Question`] (dataset preparation) → [`GenerationRecord`] (generation) →
//! [`VerifiedRecord`] (judging + aggregation) → [`TaggedRecord`] (taxonomy
//! tagging). All types serialize to the wire format consumed by downstream
//! stages, so a record written by one run can always be re-read by a later
//! one.

pub mod error;
pub mod io;


pub use error::RecordError;

use serde::{Deserialize, Serialize};

/// Task domain of a question. Controls answer matching and taxonomy rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Math,
    Code,
    Factual,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Math, Domain::Code, Domain::Factual];

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Math => "math",
            Domain::Code => "code",
            Domain::Factual => "factual",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "math" => Ok(Domain::Math),
            "code" => Ok(Domain::Code),
            "factual" => Ok(Domain::Factual),
            other => Err(format!("unknown domain: {other:?}")),
        }
    }
}

/// Immutable reference unit produced by dataset preparation.
///
/// `id` is globally unique with the format `<dataset>/<split>/<index>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub domain: Domain,
    pub dataset: String,
    pub split: String,
    pub question: String,
    pub reference_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gold_cot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// One generated attempt at a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Full chain-of-thought text, containing the extractable final answer.
    pub cot: String,
    /// Extracted final answer.
    pub answer: String,
    #[serde(default)]
    pub latency_s: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_out: Option<u64>,
}

/// The `gen` block of a generation record.
///
/// `cot`/`answer`/`latency_s`/`tokens_*` mirror the first candidate so
/// single-candidate consumers keep working against multi-sample output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationBlock {
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub cot: String,
    pub answer: String,
    #[serde(default)]
    pub latency_s: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_out: Option<u64>,
}

impl GenerationBlock {
    /// Builds the block from a non-empty candidate list, wiring the
    /// first-candidate aliases. Returns `None` for an empty list.
    pub fn from_candidates(candidates: Vec<Candidate>) -> Option<Self> {
        let first = candidates.first()?.clone();
        Some(Self {
            candidates,
            cot: first.cot,
            answer: first.answer,
            latency_s: first.latency_s,
            tokens_in: first.tokens_in,
            tokens_out: first.tokens_out,
        })
    }
}

/// Provenance of a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorInfo {
    pub provider: String,
    pub model: String,
    pub temperature: f64,
    pub n_samples: usize,
}

/// A question plus its generated candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    #[serde(flatten)]
    pub question: Question,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<GeneratorInfo>,
    #[serde(rename = "gen")]
    pub generation: GenerationBlock,
}

impl GenerationRecord {
    #[inline]
    pub fn id(&self) -> &str {
        &self.question.id
    }

    #[inline]
    pub fn domain(&self) -> Domain {
        self.question.domain
    }
}

/// Judge decision on a single candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictLabel {
    Accept,
    Reject,
}

impl VerdictLabel {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictLabel::Accept => "accept",
            VerdictLabel::Reject => "reject",
        }
    }

    #[inline]
    pub fn is_accept(&self) -> bool {
        matches!(self, VerdictLabel::Accept)
    }
}

impl std::fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-candidate judge output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateVerdict {
    pub label: VerdictLabel,
    /// Judge confidence in [0.0, 1.0].
    pub confidence: f64,
    pub rationale: String,
    #[serde(default)]
    pub latency_s: f64,
}

/// Single verdict per question, derived from the candidate verdicts.
///
/// A pure function of the verdict list (see [`crate::aggregate`]) —
/// recomputable at any time, never persisted without its source verdicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateVerdict {
    pub label: VerdictLabel,
    pub confidence: f64,
    pub candidate_count: usize,
    pub accept_count: usize,
    pub reject_count: usize,
}

/// The `verify` block of a verified record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationBlock {
    pub aggregate: AggregateVerdict,
    /// One verdict per surviving candidate, in candidate order.
    pub candidates: Vec<CandidateVerdict>,
    /// Judge calls excluded from the vote (failed or timed out).
    #[serde(default, skip_serializing_if = "is_zero")]
    pub excluded: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

/// A generation record plus its verification block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedRecord {
    #[serde(flatten)]
    pub record: GenerationRecord,
    pub verify: VerificationBlock,
}

impl VerifiedRecord {
    #[inline]
    pub fn id(&self) -> &str {
        self.record.id()
    }

    #[inline]
    pub fn domain(&self) -> Domain {
        self.record.domain()
    }

    #[inline]
    pub fn question(&self) -> &Question {
        &self.record.question
    }
}

/// A verified record annotated with a taxonomy code.
///
/// `taxonomy_code` is empty for records that were not classified (correct
/// or accepted generations).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedRecord {
    #[serde(flatten)]
    pub verified: VerifiedRecord,
    #[serde(default)]
    pub taxonomy_code: String,
    #[serde(default)]
    pub taxonomy_name: String,
}

impl TaggedRecord {
    #[inline]
    pub fn dataset(&self) -> &str {
        &self.verified.record.question.dataset
    }

    /// Returns `true` when the record carries an actual error code.
    #[inline]
    pub fn is_tagged(&self) -> bool {
        !self.taxonomy_code.is_empty()
    }
}
