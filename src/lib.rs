//! Gvgap library crate (used by the CLI binary and integration tests).
//!
//! Measures the Generation-Verification Gap: can a model judge the
//! correctness of its own (or another model's) answers better than it
//! produces them?
//!
//! # Pipeline
//!
//! ```text
//! dataset  →  generate  →  verify  →  tag  →  metrics / taxonomy
//! (Question)  (GenerationRecord)  (VerifiedRecord)  (TaggedRecord)
//! ```
//!
//! The exports are organized by module:
//!
//! ## Core engine (pure, no I/O)
//! - [`matcher`] - candidate/reference answer matching per domain
//! - [`aggregate`] - majority-vote aggregation of judge verdicts
//! - [`metrics`] - confusion matrix, accuracies and the GV-Gap
//! - [`taxonomy`] - error classification and the cumulative summary
//!
//! ## Collaborators
//! - [`provider`] - [`ChatProvider`] capability interface and adapters
//! - [`generate`] - chain-of-thought candidate generation
//! - [`judge`] - per-candidate accept/reject judging
//!
//! ## Plumbing
//! - [`record`] - record types and JSONL scanning
//! - [`pipeline`] - concurrent run orchestration
//! - [`dataset`] - dataset preparation
//! - [`inject`] - error-injection harness for verifier stress tests
//! - [`config`] - environment-backed configuration
//!
//! ## Test/Mock Support
//! A scripted `MockProvider` is available behind
//! `#[cfg(any(test, feature = "mock"))]`.

pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod generate;
pub mod inject;
pub mod judge;
pub mod matcher;
pub mod metrics;
pub mod pipeline;
pub mod provider;
pub mod record;
pub mod taxonomy;

pub use aggregate::{AggregateError, aggregate};
pub use config::{Config, ConfigError, ProviderKind};
pub use generate::{CotGenerator, extract_final_answer};
pub use judge::{Judge, LlmJudge, parse_verdict};
pub use matcher::is_correct;
pub use metrics::{ConfusionMatrix, MetricsError, MetricsResult, RunMetrics};
pub use pipeline::{GenerateStats, TagStats, VerifyStats, generate_run, tag_run, verify_run};
pub use provider::{ChatOutcome, ChatProvider, ChatTurn, ProviderError, build_provider};
#[cfg(any(test, feature = "mock"))]
pub use provider::MockProvider;
pub use record::{
    AggregateVerdict, Candidate, CandidateVerdict, Domain, GenerationRecord, Question,
    RecordError, TaggedRecord, VerdictLabel, VerifiedRecord,
};
pub use taxonomy::{TaxonomyRule, classify};
