use super::*;
use crate::record::{CandidateVerdict, VerdictLabel};

fn verdict(label: VerdictLabel, confidence: f64) -> CandidateVerdict {
    CandidateVerdict {
        label,
        confidence,
        rationale: String::new(),
        latency_s: 0.0,
    }
}

fn accept(confidence: f64) -> CandidateVerdict {
    verdict(VerdictLabel::Accept, confidence)
}

fn reject(confidence: f64) -> CandidateVerdict {
    verdict(VerdictLabel::Reject, confidence)
}

#[test]
fn test_empty_input_is_an_error() {
    assert_eq!(aggregate(&[]).unwrap_err(), AggregateError::EmptyInput);
}

#[test]
fn test_single_verdict_degenerates_to_itself() {
    let agg = aggregate(&[accept(0.9)]).unwrap();
    assert_eq!(agg.label, VerdictLabel::Accept);
    assert_eq!(agg.confidence, 0.9);
    assert_eq!(agg.candidate_count, 1);
    assert_eq!(agg.accept_count, 1);
    assert_eq!(agg.reject_count, 0);

    let agg = aggregate(&[reject(0.4)]).unwrap();
    assert_eq!(agg.label, VerdictLabel::Reject);
    assert_eq!(agg.confidence, 0.4);
}

#[test]
fn test_majority_accept_with_winning_camp_mean() {
    // 4 accepts, 1 reject; confidence is the mean of the accept camp only:
    // (0.95 + 0.90 + 0.80 + 0.75) / 4 = 0.85.
    let verdicts = [
        accept(0.95),
        accept(0.90),
        reject(0.85),
        accept(0.80),
        accept(0.75),
    ];

    let agg = aggregate(&verdicts).unwrap();
    assert_eq!(agg.label, VerdictLabel::Accept);
    assert!((agg.confidence - 0.85).abs() < 1e-12);
    assert_eq!(agg.candidate_count, 5);
    assert_eq!(agg.accept_count, 4);
    assert_eq!(agg.reject_count, 1);
}

#[test]
fn test_majority_reject() {
    let verdicts = [reject(0.6), reject(0.7), accept(0.99)];

    let agg = aggregate(&verdicts).unwrap();
    assert_eq!(agg.label, VerdictLabel::Reject);
    assert!((agg.confidence - 0.65).abs() < 1e-12);
}

#[test]
fn test_tie_breaks_on_confidence_sum() {
    // 2 vs 2; accept sum 1.7 beats reject sum 1.0.
    let verdicts = [accept(0.9), accept(0.8), reject(0.5), reject(0.5)];
    let agg = aggregate(&verdicts).unwrap();
    assert_eq!(agg.label, VerdictLabel::Accept);

    // Reject camp carries the higher sum.
    let verdicts = [accept(0.1), accept(0.2), reject(0.9), reject(0.8)];
    let agg = aggregate(&verdicts).unwrap();
    assert_eq!(agg.label, VerdictLabel::Reject);
}

#[test]
fn test_tie_with_equal_sums_defaults_to_reject() {
    let verdicts = [accept(0.7), reject(0.7)];
    let agg = aggregate(&verdicts).unwrap();
    assert_eq!(agg.label, VerdictLabel::Reject);
    assert_eq!(agg.confidence, 0.7);

    let verdicts = [accept(0.6), accept(0.8), reject(0.9), reject(0.5)];
    let agg = aggregate(&verdicts).unwrap();
    assert_eq!(agg.label, VerdictLabel::Reject);
}

#[test]
fn test_counts_always_reconcile() {
    let verdicts = [
        accept(0.1),
        reject(0.2),
        accept(0.3),
        reject(0.4),
        reject(0.5),
    ];
    let agg = aggregate(&verdicts).unwrap();

    assert_eq!(agg.candidate_count, verdicts.len());
    assert_eq!(agg.accept_count + agg.reject_count, agg.candidate_count);
}

#[test]
fn test_order_invariance() {
    let base = vec![
        accept(0.95),
        accept(0.90),
        reject(0.85),
        accept(0.80),
        accept(0.75),
    ];
    let expected = aggregate(&base).unwrap();

    // Exhaustive rotations plus a reversal stand in for full permutation
    // coverage; the label and confidence must never move.
    let mut rotated = base.clone();
    for _ in 0..base.len() {
        rotated.rotate_left(1);
        let agg = aggregate(&rotated).unwrap();
        assert_eq!(agg.label, expected.label);
        assert_eq!(agg.confidence, expected.confidence);
    }

    let mut reversed = base.clone();
    reversed.reverse();
    let agg = aggregate(&reversed).unwrap();
    assert_eq!(agg.label, expected.label);
    assert_eq!(agg.confidence, expected.confidence);
}

#[test]
fn test_exact_tie_order_invariance() {
    // Sums engineered so naive left-to-right addition could disagree
    // between orderings; the canonical sum keeps the tie exact.
    let base = vec![accept(0.1), accept(0.3), reject(0.3), reject(0.1)];
    let expected = aggregate(&base).unwrap();
    assert_eq!(expected.label, VerdictLabel::Reject);

    let mut shuffled = base.clone();
    for _ in 0..base.len() {
        shuffled.rotate_left(1);
        assert_eq!(aggregate(&shuffled).unwrap().label, expected.label);
    }
}

#[test]
fn test_unanimous_verdicts() {
    let verdicts = [accept(1.0), accept(1.0), accept(1.0)];
    let agg = aggregate(&verdicts).unwrap();
    assert_eq!(agg.label, VerdictLabel::Accept);
    assert_eq!(agg.confidence, 1.0);
    assert_eq!(agg.reject_count, 0);
}
