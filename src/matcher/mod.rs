//! Answer correctness matching.
//!
//! Decides whether a candidate answer equals the reference answer for a
//! domain. Math answers compare numerically with a small tolerance when
//! both sides parse as numbers; everything else is a case-insensitive
//! string comparison. Deliberately conservative: near-miss phrasing is the
//! judge's call, not the matcher's.

use crate::record::Domain;

/// Relative tolerance for numeric comparison.
pub const NUMERIC_REL_TOLERANCE: f64 = 1e-6;

/// Absolute tolerance for numeric comparison (handles values near zero).
pub const NUMERIC_ABS_TOLERANCE: f64 = 1e-9;

/// Returns `true` when `candidate` matches `reference` under the domain's
/// comparison rules. Never fails; an empty candidate is always incorrect.
pub fn is_correct(candidate: &str, reference: &str, domain: Domain) -> bool {
    let candidate = candidate.trim();
    let reference = reference.trim();

    if candidate.is_empty() {
        return false;
    }

    match domain {
        Domain::Math => {
            let cand = strip_numeric_symbols(candidate);
            let refr = strip_numeric_symbols(reference);
            match (cand.parse::<f64>(), refr.parse::<f64>()) {
                (Ok(a), Ok(b)) => approx_eq(a, b),
                _ => cand.to_lowercase() == refr.to_lowercase(),
            }
        }
        Domain::Code | Domain::Factual => candidate.to_lowercase() == reference.to_lowercase(),
    }
}

/// Drops currency/percent symbols and thousands separators, so "$1,000"
/// and "1000" parse to the same number.
fn strip_numeric_symbols(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | '%' | ','))
        .collect::<String>()
        .trim()
        .to_string()
}

fn approx_eq(a: f64, b: f64) -> bool {
    let diff = (a - b).abs();
    diff <= NUMERIC_ABS_TOLERANCE || diff <= NUMERIC_REL_TOLERANCE * a.abs().max(b.abs())
}
