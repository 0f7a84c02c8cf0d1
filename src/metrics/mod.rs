//! Generation-Verification Gap metrics.
//!
//! Consumes verified records plus the reference question set and produces
//! generation accuracy, verification accuracy, the GV-Gap and the
//! confusion matrix — overall and per domain. A record whose id has no
//! reference is skipped and counted, never silently dropped or folded
//! into a matrix cell.

pub mod error;
pub mod report;
pub mod types;


pub use error::MetricsError;
pub use types::{ConfusionMatrix, MetricsResult, QuestionOutcome, RunMetrics};

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::matcher;
use crate::record::{Domain, Question, VerdictLabel, VerifiedRecord};

/// Computes metrics over a record set.
///
/// Generation correctness evaluates `gen.answer` — the primary/first
/// candidate — so single- and multi-sample runs are scored consistently.
/// Verification is correct when the aggregate verdict matches ground
/// truth in either direction.
pub fn compute(
    records: &[VerifiedRecord],
    references: &HashMap<String, Question>,
) -> MetricsResult {
    let (result, _) = classify_records(records, references);
    result
}

/// Computes the overall result, a per-domain breakdown, and the
/// per-question outcomes in input order.
pub fn compute_run(
    records: &[VerifiedRecord],
    references: &HashMap<String, Question>,
) -> RunMetrics {
    let (overall, outcomes) = classify_records(records, references);

    let by_domain = Domain::ALL
        .iter()
        .filter_map(|&domain| {
            let subset: Vec<VerifiedRecord> = records
                .iter()
                .filter(|r| r.domain() == domain)
                .cloned()
                .collect();
            if subset.is_empty() {
                return None;
            }
            let (result, _) = classify_records(&subset, references);
            Some((domain, result))
        })
        .collect();

    RunMetrics {
        overall,
        by_domain,
        outcomes,
    }
}

fn classify_records(
    records: &[VerifiedRecord],
    references: &HashMap<String, Question>,
) -> (MetricsResult, Vec<QuestionOutcome>) {
    let mut result = MetricsResult::default();
    let mut outcomes = Vec::with_capacity(records.len());

    for record in records {
        let Some(reference) = references.get(record.id()) else {
            result.skipped += 1;
            warn!(id = record.id(), "no reference answer, skipping record");
            continue;
        };

        let generated = &record.record.generation.answer;
        let generation_correct =
            matcher::is_correct(generated, &reference.reference_answer, record.domain());

        let verdict = &record.verify.aggregate;
        let verification_correct = match verdict.label {
            VerdictLabel::Accept => generation_correct,
            VerdictLabel::Reject => !generation_correct,
        };

        result.total += 1;
        if generation_correct {
            result.generation_correct += 1;
        }
        if verification_correct {
            result.verification_correct += 1;
        }

        match (verdict.label, generation_correct) {
            (VerdictLabel::Accept, true) => result.matrix.true_positives += 1,
            (VerdictLabel::Reject, false) => result.matrix.true_negatives += 1,
            (VerdictLabel::Accept, false) => result.matrix.false_positives += 1,
            (VerdictLabel::Reject, true) => result.matrix.false_negatives += 1,
        }

        outcomes.push(QuestionOutcome {
            id: record.id().to_string(),
            domain: record.domain(),
            generated_answer: generated.clone(),
            reference_answer: reference.reference_answer.clone(),
            generation_correct,
            verdict_label: verdict.label,
            verdict_confidence: verdict.confidence,
            verification_correct,
        });
    }

    debug!(
        total = result.total,
        skipped = result.skipped,
        generation_correct = result.generation_correct,
        verification_correct = result.verification_correct,
        "metrics computed"
    );

    (result, outcomes)
}
