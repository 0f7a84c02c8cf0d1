use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("cannot aggregate zero verdicts: a question must have at least one candidate")]
    EmptyInput,
}
