//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `GVGAP_*` environment
//! variables; CLI flags take precedence over both.

pub mod error;


pub use error::ConfigError;

use std::env;

/// Which chat adapter to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Multi-provider routing via the `genai` client ("openai" accepted
    /// as an alias).
    GenAi,
    /// Raw OpenAI-compatible HTTP endpoint ("together" accepted as an
    /// alias).
    OpenAiCompat,
}

impl ProviderKind {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::GenAi => "genai",
            ProviderKind::OpenAiCompat => "openai-compat",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "genai" | "openai" => Ok(ProviderKind::GenAi),
            "openai-compat" | "together" => Ok(ProviderKind::OpenAiCompat),
            _ => Err(ConfigError::InvalidProvider {
                value: s.to_string(),
            }),
        }
    }
}

/// Default OpenAI-compatible endpoint (Together serverless).
pub const DEFAULT_OPENAI_COMPAT_URL: &str = "https://api.together.xyz/v1/chat/completions";

/// Pipeline configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `GVGAP_*` overrides on top of
/// defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Chat adapter. Default: `genai`.
    pub provider: ProviderKind,

    /// Generation model name. Default: `gpt-4o-mini`.
    pub model: String,

    /// Judge model name. Default: same as `model`.
    pub judge_model: String,

    /// Candidates generated per question. Default: `1`.
    pub n_samples: usize,

    /// Questions processed concurrently. Default: `4`.
    pub fan_out: usize,

    /// Endpoint for the OpenAI-compatible adapter.
    pub openai_compat_url: String,

    /// Bearer token for the OpenAI-compatible adapter. Read from
    /// `GVGAP_API_KEY`, falling back to `TOGETHER_API_KEY`.
    pub api_key: Option<String>,

    /// Per-request timeout in seconds. Default: `60`.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::GenAi,
            model: "gpt-4o-mini".to_string(),
            judge_model: "gpt-4o-mini".to_string(),
            n_samples: 1,
            fan_out: 4,
            openai_compat_url: DEFAULT_OPENAI_COMPAT_URL.to_string(),
            api_key: None,
            request_timeout_secs: 60,
        }
    }
}

impl Config {
    const ENV_PROVIDER: &'static str = "GVGAP_PROVIDER";
    const ENV_MODEL: &'static str = "GVGAP_MODEL";
    const ENV_JUDGE_MODEL: &'static str = "GVGAP_JUDGE_MODEL";
    const ENV_N_SAMPLES: &'static str = "GVGAP_N_SAMPLES";
    const ENV_FAN_OUT: &'static str = "GVGAP_FAN_OUT";
    const ENV_OPENAI_COMPAT_URL: &'static str = "GVGAP_OPENAI_COMPAT_URL";
    const ENV_API_KEY: &'static str = "GVGAP_API_KEY";
    const ENV_API_KEY_FALLBACK: &'static str = "TOGETHER_API_KEY";
    const ENV_TIMEOUT_SECS: &'static str = "GVGAP_TIMEOUT_SECS";

    /// Loads configuration from environment variables (falling back to
    /// defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let provider = match env::var(Self::ENV_PROVIDER) {
            Ok(value) => value.parse()?,
            Err(_) => defaults.provider,
        };

        let model = Self::parse_string_from_env(Self::ENV_MODEL, defaults.model);
        let judge_model = Self::parse_string_from_env(Self::ENV_JUDGE_MODEL, model.clone());
        let n_samples = Self::parse_usize_from_env(Self::ENV_N_SAMPLES, defaults.n_samples);
        let fan_out = Self::parse_usize_from_env(Self::ENV_FAN_OUT, defaults.fan_out);
        let openai_compat_url =
            Self::parse_string_from_env(Self::ENV_OPENAI_COMPAT_URL, defaults.openai_compat_url);
        let api_key = Self::parse_optional_string_from_env(Self::ENV_API_KEY)
            .or_else(|| Self::parse_optional_string_from_env(Self::ENV_API_KEY_FALLBACK));
        let request_timeout_secs =
            Self::parse_u64_from_env(Self::ENV_TIMEOUT_SECS, defaults.request_timeout_secs);

        Ok(Self {
            provider,
            model,
            judge_model,
            n_samples,
            fan_out,
            openai_compat_url,
            api_key,
            request_timeout_secs,
        })
    }

    /// Validates basic invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_samples == 0 {
            return Err(ConfigError::ZeroNotAllowed {
                var: Self::ENV_N_SAMPLES,
            });
        }
        if self.fan_out == 0 {
            return Err(ConfigError::ZeroNotAllowed {
                var: Self::ENV_FAN_OUT,
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroNotAllowed {
                var: Self::ENV_TIMEOUT_SECS,
            });
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                var: Self::ENV_MODEL,
            });
        }
        Ok(())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_usize_from_env(var_name: &str, default: usize) -> usize {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
