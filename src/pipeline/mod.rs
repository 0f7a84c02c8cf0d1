//! Run orchestration.
//!
//! Fans generation and verification out across questions with bounded
//! concurrency and turns per-call failures into counted exclusions
//! instead of run failures. Output order always matches input order.


use std::collections::HashMap;

use futures_util::StreamExt;
use futures_util::future::join_all;
use futures_util::stream;
use tracing::{info, warn};

use crate::aggregate::{self, AggregateError};
use crate::generate::CotGenerator;
use crate::judge::Judge;
use crate::matcher;
use crate::record::{
    GenerationRecord, Question, TaggedRecord, VerdictLabel, VerificationBlock, VerifiedRecord,
};
use crate::taxonomy;

/// Counters for a generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateStats {
    pub questions: usize,
    pub generated: usize,
    pub failed: usize,
}

/// Counters for a verification run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyStats {
    pub questions: usize,
    pub verified: usize,
    /// Questions dropped because every judge call failed.
    pub skipped: usize,
    /// Individual judge calls excluded from votes.
    pub excluded: usize,
}

/// Counters for a tagging pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagStats {
    pub tagged: usize,
    pub clean: usize,
}

/// Generates candidates for every question, `fan_out` questions at a
/// time. A failed question is logged and counted, not fatal.
pub async fn generate_run(
    generator: &CotGenerator,
    questions: &[Question],
    fan_out: usize,
) -> (Vec<GenerationRecord>, GenerateStats) {
    let mut stats = GenerateStats {
        questions: questions.len(),
        ..Default::default()
    };

    let results: Vec<_> = stream::iter(questions.iter().map(|q| generator.generate(q)))
        .buffered(fan_out.max(1))
        .collect()
        .await;

    let mut records = Vec::with_capacity(results.len());
    for (question, result) in questions.iter().zip(results) {
        match result {
            Ok(record) => {
                stats.generated += 1;
                records.push(record);
            }
            Err(e) => {
                stats.failed += 1;
                warn!(id = %question.id, error = %e, "generation failed, skipping question");
            }
        }
    }

    info!(
        questions = stats.questions,
        generated = stats.generated,
        failed = stats.failed,
        "generation run complete"
    );

    (records, stats)
}

/// Judges every candidate of every record and aggregates the verdicts,
/// `fan_out` questions at a time (a question's candidates are judged
/// concurrently as one batch).
///
/// A failed judge call removes that candidate from the vote and bumps
/// the record's `excluded` count; a question left with zero verdicts has
/// no aggregate and is dropped with `VerifyStats::skipped`.
pub async fn verify_run(
    judge: &dyn Judge,
    records: Vec<GenerationRecord>,
    fan_out: usize,
) -> (Vec<VerifiedRecord>, VerifyStats) {
    let mut stats = VerifyStats {
        questions: records.len(),
        ..Default::default()
    };

    let results: Vec<_> = stream::iter(records.into_iter().map(|record| verify_one(judge, record)))
        .buffered(fan_out.max(1))
        .collect()
        .await;

    let mut verified = Vec::with_capacity(results.len());
    for (record, excluded) in results {
        stats.excluded += excluded;
        match record {
            Some(record) => {
                stats.verified += 1;
                verified.push(record);
            }
            None => stats.skipped += 1,
        }
    }

    info!(
        questions = stats.questions,
        verified = stats.verified,
        skipped = stats.skipped,
        excluded = stats.excluded,
        "verification run complete"
    );

    (verified, stats)
}

async fn verify_one(
    judge: &dyn Judge,
    record: GenerationRecord,
) -> (Option<VerifiedRecord>, usize) {
    let question_text = record.question.question.clone();

    let results = join_all(
        record
            .generation
            .candidates
            .iter()
            .map(|candidate| judge.judge(&question_text, candidate)),
    )
    .await;

    let mut verdicts = Vec::with_capacity(results.len());
    let mut excluded = 0usize;
    for result in results {
        match result {
            Ok(verdict) => verdicts.push(verdict),
            Err(e) => {
                excluded += 1;
                warn!(id = record.id(), error = %e, "judge call failed, excluding candidate from vote");
            }
        }
    }

    match aggregate::aggregate(&verdicts) {
        Ok(aggregate) => (
            Some(VerifiedRecord {
                record,
                verify: VerificationBlock {
                    aggregate,
                    candidates: verdicts,
                    excluded,
                },
            }),
            excluded,
        ),
        Err(AggregateError::EmptyInput) => {
            warn!(id = record.id(), "no verdicts available, skipping question");
            (None, excluded)
        }
    }
}

/// Annotates records with taxonomy codes.
///
/// With a reference set, a record is classified when its generation
/// answer is incorrect; without one, when the aggregate verdict rejects.
/// Everything else keeps an empty code and the name "No error".
pub fn tag_run(
    records: Vec<VerifiedRecord>,
    references: Option<&HashMap<String, Question>>,
) -> (Vec<TaggedRecord>, TagStats) {
    let mut stats = TagStats::default();

    let tagged = records
        .into_iter()
        .map(|record| {
            let needs_tag = match references.and_then(|refs| refs.get(record.id())) {
                Some(reference) => !matcher::is_correct(
                    &record.record.generation.answer,
                    &reference.reference_answer,
                    record.domain(),
                ),
                None => record.verify.aggregate.label == VerdictLabel::Reject,
            };

            let (taxonomy_code, taxonomy_name) = if needs_tag {
                stats.tagged += 1;
                let rationale = taxonomy::classification_rationale(&record.verify.candidates);
                let rule = taxonomy::classify(&rationale, record.domain());
                (rule.code.to_string(), rule.name.to_string())
            } else {
                stats.clean += 1;
                (String::new(), "No error".to_string())
            };

            TaggedRecord {
                verified: record,
                taxonomy_code,
                taxonomy_name,
            }
        })
        .collect();

    info!(
        tagged = stats.tagged,
        clean = stats.clean,
        "tagging pass complete"
    );

    (tagged, stats)
}
