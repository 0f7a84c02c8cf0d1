use crate::record::{Domain, VerdictLabel};

/// Four-cell confusion matrix over questions: verdict direction crossed
/// with actual generation correctness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    /// Accepted a correct answer.
    pub true_positives: usize,
    /// Rejected an incorrect answer.
    pub true_negatives: usize,
    /// Accepted an incorrect answer.
    pub false_positives: usize,
    /// Rejected a correct answer.
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    /// Total classified questions; always equals the non-skipped count.
    #[inline]
    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// Cells where the verdict matched ground truth.
    #[inline]
    pub fn correct(&self) -> usize {
        self.true_positives + self.true_negatives
    }
}

/// Run-scoped metrics, computed fresh per invocation and never mutated.
///
/// Counts are stored; the accuracies are derived on access and return
/// `None` for an empty run instead of dividing by zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsResult {
    /// Questions that entered the matrix.
    pub total: usize,
    /// Records excluded for a missing/unmatched reference.
    pub skipped: usize,
    pub generation_correct: usize,
    pub verification_correct: usize,
    pub matrix: ConfusionMatrix,
}

impl MetricsResult {
    #[inline]
    pub fn has_data(&self) -> bool {
        self.total > 0
    }

    pub fn generation_accuracy(&self) -> Option<f64> {
        self.has_data()
            .then(|| self.generation_correct as f64 / self.total as f64)
    }

    pub fn verification_accuracy(&self) -> Option<f64> {
        self.has_data()
            .then(|| self.verification_correct as f64 / self.total as f64)
    }

    /// Verification accuracy minus generation accuracy.
    pub fn gv_gap(&self) -> Option<f64> {
        Some(self.verification_accuracy()? - self.generation_accuracy()?)
    }
}

/// Per-question classification detail, kept for the detail CSV.
#[derive(Debug, Clone)]
pub struct QuestionOutcome {
    pub id: String,
    pub domain: Domain,
    pub generated_answer: String,
    pub reference_answer: String,
    pub generation_correct: bool,
    pub verdict_label: VerdictLabel,
    pub verdict_confidence: f64,
    pub verification_correct: bool,
}

/// Metrics for one run: the overall result, one result per domain
/// present in the input, and the per-question outcomes.
#[derive(Debug, Clone)]
pub struct RunMetrics {
    pub overall: MetricsResult,
    pub by_domain: Vec<(Domain, MetricsResult)>,
    pub outcomes: Vec<QuestionOutcome>,
}
