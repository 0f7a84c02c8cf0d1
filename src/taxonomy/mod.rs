//! Error taxonomy classification.
//!
//! Maps a judge rationale for an incorrect/rejected generation onto one of
//! the fixed per-domain error codes in [`rules`]. First matching rule in
//! table order wins; no match falls through to the domain catch-all.

pub mod rules;
pub mod summary;


pub use rules::{TaxonomyRule, fallback_for, rules_for};
pub use summary::{TaxonomyCounts, fold, fold_files, render_markdown};

use crate::record::{CandidateVerdict, Domain, VerdictLabel};

/// Classifies a rationale into the domain's taxonomy.
///
/// Matching is case-insensitive substring search over the rationale text.
/// The caller decides *whether* a record should be classified at all
/// (only incorrect/rejected generations are); this function always
/// produces a rule for the text it is given.
pub fn classify(rationale: &str, domain: Domain) -> &'static TaxonomyRule {
    let haystack = rationale.to_lowercase();

    rules_for(domain)
        .iter()
        .find(|rule| rule.triggers.iter().any(|t| haystack.contains(t)))
        .unwrap_or_else(|| fallback_for(domain))
}

/// Builds the text handed to [`classify`] from a question's verdicts.
///
/// Rejecting verdicts describe the error, so their rationales are joined
/// first; when nothing rejected, all rationales are used.
pub fn classification_rationale(verdicts: &[CandidateVerdict]) -> String {
    let rejects: Vec<&str> = verdicts
        .iter()
        .filter(|v| v.label == VerdictLabel::Reject)
        .map(|v| v.rationale.as_str())
        .collect();

    let picked = if rejects.is_empty() {
        verdicts.iter().map(|v| v.rationale.as_str()).collect()
    } else {
        rejects
    };

    picked.join("; ")
}
