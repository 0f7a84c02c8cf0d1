use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("chat request failed ({provider}): {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("provider returned an empty response")]
    EmptyResponse,

    #[error("failed to build http client: {0}")]
    ClientBuild(String),

    #[cfg(any(test, feature = "mock"))]
    #[error("mock provider has no scripted response left")]
    MockExhausted,
}
