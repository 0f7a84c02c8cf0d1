//! Human and machine renderings of a [`RunMetrics`].

use super::error::MetricsError;
use super::types::{MetricsResult, QuestionOutcome, RunMetrics};

/// Renders the headline summary block.
///
/// Fails with [`MetricsError::InsufficientData`] when the run scored zero
/// questions — a human summary of nothing would hide the problem.
pub fn render_summary(result: &MetricsResult) -> Result<String, MetricsError> {
    if !result.has_data() {
        return Err(MetricsError::InsufficientData);
    }

    // Accessors are Some(...) past the has_data guard.
    let gen_acc = result.generation_accuracy().unwrap_or(f64::NAN);
    let ver_acc = result.verification_accuracy().unwrap_or(f64::NAN);
    let gv_gap = result.gv_gap().unwrap_or(f64::NAN);

    let interpretation = if gv_gap > 0.0 {
        "Positive GV-Gap: verifier outperforms generator (good self-verification)"
    } else if gv_gap < 0.0 {
        "Negative GV-Gap: generator outperforms verifier (poor self-verification)"
    } else {
        "Zero GV-Gap: generator and verifier perform equally"
    };

    let mut out = String::new();
    out.push_str(&"=".repeat(60));
    out.push_str("\nGENERATION-VERIFICATION GAP ANALYSIS\n");
    out.push_str(&"=".repeat(60));
    out.push('\n');
    out.push_str(&format!("Total Questions: {}\n", result.total));
    out.push_str(&format!(
        "Generation Accuracy: {:.3} ({}/{})\n",
        gen_acc, result.generation_correct, result.total
    ));
    out.push_str(&format!(
        "Verification Accuracy: {:.3} ({}/{})\n",
        ver_acc, result.verification_correct, result.total
    ));
    out.push_str(&format!("GV-Gap: {gv_gap:+.3}\n"));
    out.push_str(interpretation);
    out.push_str("\n\nVerification Patterns:\n");
    out.push_str(&format!(
        "True Positives (accept correct): {}\n",
        result.matrix.true_positives
    ));
    out.push_str(&format!(
        "True Negatives (reject incorrect): {}\n",
        result.matrix.true_negatives
    ));
    out.push_str(&format!(
        "False Positives (accept incorrect): {}\n",
        result.matrix.false_positives
    ));
    out.push_str(&format!(
        "False Negatives (reject correct): {}\n",
        result.matrix.false_negatives
    ));
    out.push_str(&format!("\nSkipped records: {}\n", result.skipped));

    Ok(out)
}

/// Renders the scope CSV: an `overall` row plus one row per domain.
///
/// Accuracies for an empty scope are written as `NaN` rather than zero so
/// "no data" stays distinguishable from "zero accuracy".
pub fn render_scope_csv(run: &RunMetrics) -> String {
    let mut out =
        String::from("scope,n,generation_accuracy,verification_accuracy,gv_gap,tp,tn,fp,fn\n");

    push_scope_row(&mut out, "overall", &run.overall);
    for (domain, result) in &run.by_domain {
        push_scope_row(&mut out, domain.as_str(), result);
    }

    out
}

fn push_scope_row(out: &mut String, scope: &str, result: &MetricsResult) {
    out.push_str(&format!(
        "{},{},{},{},{},{},{},{},{}\n",
        scope,
        result.total,
        fmt_accuracy(result.generation_accuracy()),
        fmt_accuracy(result.verification_accuracy()),
        fmt_accuracy(result.gv_gap()),
        result.matrix.true_positives,
        result.matrix.true_negatives,
        result.matrix.false_positives,
        result.matrix.false_negatives,
    ));
}

fn fmt_accuracy(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.6}"),
        None => "NaN".to_string(),
    }
}

/// Renders the per-question detail CSV.
pub fn render_detail_csv(outcomes: &[QuestionOutcome]) -> String {
    let mut out = String::from(
        "id,generated_answer,reference_answer,generation_correct,verify_label,verify_confidence,verification_correct\n",
    );

    for outcome in outcomes {
        out.push_str(&format!(
            "{},{},{},{},{},{:.3},{}\n",
            csv_field(&outcome.id),
            csv_field(&outcome.generated_answer),
            csv_field(&outcome.reference_answer),
            outcome.generation_correct,
            outcome.verdict_label,
            outcome.verdict_confidence,
            outcome.verification_correct,
        ));
    }

    out
}

/// Quotes a field when it contains a delimiter, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
