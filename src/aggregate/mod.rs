//! Verdict aggregation.
//!
//! Combines the judge's per-candidate verdicts for one question into a
//! single [`AggregateVerdict`]. Pure and order-invariant: permuting the
//! input changes neither the label nor the confidence.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::AggregateError;

use crate::record::{AggregateVerdict, CandidateVerdict, VerdictLabel};

/// Aggregates a non-empty verdict list by majority vote.
///
/// Ties (equal accept/reject counts) go to the camp with the higher
/// confidence sum; a tie on the sums as well resolves to `reject` — an
/// unresolved disagreement must not default to trusting the answer.
/// The aggregate confidence is the mean confidence of the winning camp
/// only, not of all verdicts.
pub fn aggregate(verdicts: &[CandidateVerdict]) -> Result<AggregateVerdict, AggregateError> {
    if verdicts.is_empty() {
        return Err(AggregateError::EmptyInput);
    }

    let accepts: Vec<f64> = confidences(verdicts, VerdictLabel::Accept);
    let rejects: Vec<f64> = confidences(verdicts, VerdictLabel::Reject);

    let label = match accepts.len().cmp(&rejects.len()) {
        std::cmp::Ordering::Greater => VerdictLabel::Accept,
        std::cmp::Ordering::Less => VerdictLabel::Reject,
        std::cmp::Ordering::Equal => {
            if ordered_sum(&accepts) > ordered_sum(&rejects) {
                VerdictLabel::Accept
            } else {
                VerdictLabel::Reject
            }
        }
    };

    let winning = match label {
        VerdictLabel::Accept => &accepts,
        VerdictLabel::Reject => &rejects,
    };

    Ok(AggregateVerdict {
        label,
        confidence: ordered_sum(winning) / winning.len() as f64,
        candidate_count: verdicts.len(),
        accept_count: accepts.len(),
        reject_count: rejects.len(),
    })
}

fn confidences(verdicts: &[CandidateVerdict], label: VerdictLabel) -> Vec<f64> {
    verdicts
        .iter()
        .filter(|v| v.label == label)
        .map(|v| v.confidence)
        .collect()
}

/// Sums in ascending value order. Float addition is not associative, so a
/// naive sum over a permuted input could flip an exact tie; the canonical
/// order makes the result bit-identical for any permutation.
fn ordered_sum(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.iter().sum()
}
