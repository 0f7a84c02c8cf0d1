use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetricsError {
    #[error("no scorable questions in run: every record was skipped or the input was empty")]
    InsufficientData,
}
