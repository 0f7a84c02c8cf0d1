//! Error-injection harness.
//!
//! Corrupts numeric reference answers in controlled ways and emits the
//! corrupted values as ordinary generation records, so the standard
//! verify → metrics pipeline can measure how often the judge catches
//! known-wrong answers. Injection is seeded and fully deterministic for
//! a given (seed, input) pair.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use crate::record::{
    Candidate, GenerationBlock, GenerationRecord, Question, VerdictLabel, VerifiedRecord,
};

/// Metadata key carrying the injected error type.
pub const ERROR_TYPE_KEY: &str = "error_type";

/// Kinds of corruption applied to a numeric answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    OffByOne,
    SignFlip,
    SmallPerturb,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 3] = [
        ErrorKind::OffByOne,
        ErrorKind::SignFlip,
        ErrorKind::SmallPerturb,
    ];

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::OffByOne => "off_by_one",
            ErrorKind::SignFlip => "sign_flip",
            ErrorKind::SmallPerturb => "small_perturb",
        }
    }
}

/// Extracts the last number appearing in a string, the convention for
/// reference answers that embed units or symbols.
pub fn parse_trailing_number(s: &str) -> Option<f64> {
    let mut last: Option<f64> = None;
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        let starts_number = c.is_ascii_digit()
            || (c == '-'
                && bytes
                    .get(i + 1)
                    .is_some_and(|&next| (next as char).is_ascii_digit()));

        if starts_number {
            let start = i;
            i += 1; // consume digit or leading minus
            let mut seen_dot = false;
            while i < bytes.len() {
                let c = bytes[i] as char;
                if c.is_ascii_digit() {
                    i += 1;
                } else if c == '.' && !seen_dot
                    && bytes
                        .get(i + 1)
                        .is_some_and(|&next| (next as char).is_ascii_digit())
                {
                    seen_dot = true;
                    i += 1;
                } else {
                    break;
                }
            }
            if let Ok(value) = s[start..i].parse::<f64>() {
                last = Some(value);
            }
        } else {
            i += 1;
        }
    }

    last
}

/// Formats a number the way reference answers are written: no decimal
/// point for integral values.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Applies one corruption to a value.
pub fn corrupt(value: f64, kind: ErrorKind, rng: &mut StdRng) -> f64 {
    match kind {
        ErrorKind::OffByOne => {
            if rng.gen_bool(0.5) {
                value + 1.0
            } else {
                value - 1.0
            }
        }
        ErrorKind::SignFlip => -value,
        ErrorKind::SmallPerturb => {
            const DELTAS: [f64; 4] = [2.0, -2.0, 3.0, -3.0];
            value + DELTAS[rng.gen_range(0..DELTAS.len())]
        }
    }
}

/// Seeded corruption of question reference answers.
pub struct Injector {
    rng: StdRng,
    variants: usize,
}

impl Injector {
    pub fn new(seed: u64, variants: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            variants: variants.max(1),
        }
    }

    /// Produces `variants` corrupted generation records for a question,
    /// or none when the reference answer carries no number.
    pub fn inject(&mut self, question: &Question) -> Vec<GenerationRecord> {
        let Some(reference) = parse_trailing_number(&question.reference_answer) else {
            return Vec::new();
        };

        (0..self.variants)
            .filter_map(|variant| {
                let kind = ErrorKind::ALL[self.rng.gen_range(0..ErrorKind::ALL.len())];
                let corrupted = format_number(corrupt(reference, kind, &mut self.rng));

                let mut corrupted_question = question.clone();
                corrupted_question.id = format!("{}::v{}", question.id, variant + 1);
                corrupted_question.reference_answer = format_number(reference);
                corrupted_question.metadata = Some(json!({
                    "error_injected": true,
                    ERROR_TYPE_KEY: kind.as_str(),
                }));

                let generation = GenerationBlock::from_candidates(vec![Candidate {
                    cot: format!("Final: {corrupted}"),
                    answer: corrupted,
                    latency_s: 0.0,
                    tokens_in: None,
                    tokens_out: None,
                }])?;

                Some(GenerationRecord {
                    question: corrupted_question,
                    generator: None,
                    generation,
                })
            })
            .collect()
    }

    /// Builds the matching reference Question for each injected record,
    /// so injected runs can flow through the metrics stage.
    pub fn reference_for(record: &GenerationRecord) -> Question {
        record.question.clone()
    }
}

/// Per-error-type verifier performance on injected records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MissRateRow {
    pub total: usize,
    /// Records the verifier rejected (every injected record is wrong, so
    /// reject is the correct call).
    pub caught: usize,
}

impl MissRateRow {
    /// False-negative rate on known-wrong answers.
    pub fn miss_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        1.0 - self.caught as f64 / self.total as f64
    }
}

/// Tallies verifier catches per injected error type. Records without an
/// `error_type` metadata entry land under "unknown".
pub fn miss_rates(records: &[VerifiedRecord]) -> BTreeMap<String, MissRateRow> {
    let mut rows: BTreeMap<String, MissRateRow> = BTreeMap::new();

    for record in records {
        let error_type = record
            .question()
            .metadata
            .as_ref()
            .and_then(|m| m.get(ERROR_TYPE_KEY))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();

        let row = rows.entry(error_type).or_default();
        row.total += 1;
        if record.verify.aggregate.label == VerdictLabel::Reject {
            row.caught += 1;
        }
    }

    rows
}

/// Renders the miss-rate table.
pub fn render_miss_rates(rows: &BTreeMap<String, MissRateRow>) -> String {
    let mut out = format!(
        "{:<14} | {:^5} | {:^6} | {:^12}\n{}\n",
        "ErrorType",
        "Total",
        "Caught",
        "MissRate(FNR)",
        "-".repeat(45)
    );

    for (error_type, row) in rows {
        out.push_str(&format!(
            "{:<14} | {:^5} | {:^6} | {:^12.2}\n",
            error_type,
            row.total,
            row.caught,
            row.miss_rate()
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AggregateVerdict, CandidateVerdict, Domain, VerificationBlock};

    fn question(reference: &str) -> Question {
        Question {
            id: "gsm8k/pilot/0".into(),
            domain: Domain::Math,
            dataset: "gsm8k".into(),
            split: "pilot".into(),
            question: "q".into(),
            reference_answer: reference.into(),
            gold_cot: None,
            metadata: None,
        }
    }

    fn verified_injected(error_type: &str, label: VerdictLabel) -> VerifiedRecord {
        let mut q = question("72");
        q.metadata = Some(json!({"error_injected": true, "error_type": error_type}));
        let generation = GenerationBlock::from_candidates(vec![Candidate {
            cot: "Final: 73".into(),
            answer: "73".into(),
            latency_s: 0.0,
            tokens_in: None,
            tokens_out: None,
        }])
        .unwrap();

        VerifiedRecord {
            record: GenerationRecord {
                question: q,
                generator: None,
                generation,
            },
            verify: VerificationBlock {
                aggregate: AggregateVerdict {
                    label,
                    confidence: 0.8,
                    candidate_count: 1,
                    accept_count: usize::from(label == VerdictLabel::Accept),
                    reject_count: usize::from(label == VerdictLabel::Reject),
                },
                candidates: vec![CandidateVerdict {
                    label,
                    confidence: 0.8,
                    rationale: "r".into(),
                    latency_s: 0.0,
                }],
                excluded: 0,
            },
        }
    }

    #[test]
    fn test_parse_trailing_number() {
        assert_eq!(parse_trailing_number("72"), Some(72.0));
        assert_eq!(parse_trailing_number("about 10 or 12"), Some(12.0));
        assert_eq!(parse_trailing_number("-5.5 dollars"), Some(-5.5));
        assert_eq!(parse_trailing_number("no digits"), None);
        assert_eq!(parse_trailing_number(""), None);
    }

    #[test]
    fn test_format_number_integral_drops_decimals() {
        assert_eq!(format_number(72.0), "72");
        assert_eq!(format_number(-5.0), "-5");
        assert_eq!(format_number(2.5), "2.5");
    }

    #[test]
    fn test_corruptions_change_the_value() {
        let mut rng = StdRng::seed_from_u64(7);
        for kind in ErrorKind::ALL {
            let corrupted = corrupt(42.0, kind, &mut rng);
            assert_ne!(corrupted, 42.0, "{kind:?} must alter the value");
        }
    }

    #[test]
    fn test_sign_flip_is_exact() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(corrupt(42.0, ErrorKind::SignFlip, &mut rng), -42.0);
    }

    #[test]
    fn test_injector_is_deterministic_for_a_seed() {
        let q = question("72");

        let first: Vec<String> = Injector::new(42, 5)
            .inject(&q)
            .into_iter()
            .map(|r| r.generation.answer)
            .collect();
        let second: Vec<String> = Injector::new(42, 5)
            .inject(&q)
            .into_iter()
            .map(|r| r.generation.answer)
            .collect();

        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
    }

    #[test]
    fn test_injector_output_shape() {
        let q = question("72");
        let records = Injector::new(42, 3).inject(&q);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id(), "gsm8k/pilot/0::v1");
        assert_eq!(records[2].id(), "gsm8k/pilot/0::v3");

        for record in &records {
            // Every injected answer differs from the true reference.
            assert_ne!(record.generation.answer, "72");
            assert_eq!(record.question.reference_answer, "72");
            let error_type = record
                .question
                .metadata
                .as_ref()
                .and_then(|m| m.get(ERROR_TYPE_KEY))
                .and_then(|v| v.as_str())
                .unwrap();
            assert!(ErrorKind::ALL.iter().any(|k| k.as_str() == error_type));
        }
    }

    #[test]
    fn test_injector_skips_non_numeric_references() {
        let records = Injector::new(42, 5).inject(&question("Paris"));
        assert!(records.is_empty());
    }

    #[test]
    fn test_miss_rates_by_error_type() {
        let records = vec![
            verified_injected("off_by_one", VerdictLabel::Reject),
            verified_injected("off_by_one", VerdictLabel::Accept),
            verified_injected("sign_flip", VerdictLabel::Reject),
        ];

        let rows = miss_rates(&records);
        assert_eq!(rows["off_by_one"].total, 2);
        assert_eq!(rows["off_by_one"].caught, 1);
        assert!((rows["off_by_one"].miss_rate() - 0.5).abs() < 1e-12);
        assert_eq!(rows["sign_flip"].caught, 1);
        assert_eq!(rows["sign_flip"].miss_rate(), 0.0);
    }

    #[test]
    fn test_render_miss_rates_table() {
        let records = vec![verified_injected("off_by_one", VerdictLabel::Reject)];
        let table = render_miss_rates(&miss_rates(&records));

        assert!(table.contains("ErrorType"));
        assert!(table.contains("off_by_one"));
        assert!(table.contains("0.00"));
    }
}
