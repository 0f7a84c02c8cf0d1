//! Cumulative taxonomy summary.
//!
//! The summary is a pure fold over all persisted tagged records, rebuilt
//! from a full rescan on every invocation. There is deliberately no
//! incremental counter to keep in sync with its inputs: repeated builds
//! are idempotent and can run concurrently with other runs.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::record::io::read_jsonl;
use crate::record::{RecordError, TaggedRecord};

/// Count per (dataset, taxonomy_code). `BTreeMap` keeps the iteration
/// order deterministic for rendering.
pub type TaxonomyCounts = BTreeMap<(String, String), u64>;

/// Folds tagged records into cumulative counts. Untagged records (empty
/// code) are ignored.
pub fn fold<'a, I>(records: I) -> TaxonomyCounts
where
    I: IntoIterator<Item = &'a TaggedRecord>,
{
    let mut counts = TaxonomyCounts::new();

    for record in records {
        if !record.is_tagged() {
            continue;
        }
        *counts
            .entry((record.dataset().to_string(), record.taxonomy_code.clone()))
            .or_insert(0) += 1;
    }

    counts
}

/// Rebuilds the summary by rescanning every tagged-record file.
///
/// Returns the counts plus the total number of malformed lines skipped
/// across all files.
pub fn fold_files(paths: &[PathBuf]) -> Result<(TaxonomyCounts, usize), RecordError> {
    let mut all = Vec::new();
    let mut skipped = 0usize;

    for path in paths {
        let outcome = read_jsonl::<TaggedRecord>(path)?;
        skipped += outcome.skipped;
        all.extend(outcome.records);
    }

    Ok((fold(all.iter()), skipped))
}

/// Renders the counts as a markdown table, one row per (dataset, code),
/// sorted by dataset and then by descending count.
pub fn render_markdown(counts: &TaxonomyCounts) -> String {
    let mut rows: Vec<(&str, &str, u64)> = counts
        .iter()
        .map(|((dataset, code), count)| (dataset.as_str(), code.as_str(), *count))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(b.0).then(b.2.cmp(&a.2)).then(a.1.cmp(b.1)));

    let mut out = String::from("| Dataset | Taxonomy Code | Count |\n|---|---|---|\n");
    for (dataset, code, count) in rows {
        out.push_str(&format!("| {dataset} | {code} | {count} |\n"));
    }
    out
}
