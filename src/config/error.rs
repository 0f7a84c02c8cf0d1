use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid provider {value:?} (expected \"genai\" or \"openai-compat\")")]
    InvalidProvider { value: String },

    #[error("{var} must be at least 1")]
    ZeroNotAllowed { var: &'static str },

    #[error("{var} must not be empty")]
    EmptyValue { var: &'static str },
}
