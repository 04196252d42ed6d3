use thiserror::Error;

/// Problems detected before any virtual user starts.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("virtual user count must be at least 1")]
    NoVirtualUsers,

    #[error("run duration must be greater than zero and, with grace period and think time, fit the clock")]
    InvalidDuration,

    #[error("invalid base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("latency threshold must be greater than zero")]
    InvalidLatencyThreshold,

    #[error("error rate threshold must be within [0, 1], got {0}")]
    InvalidErrorRateThreshold(f64),

    #[error("at least one scenario is required")]
    NoScenarios,

    #[error("scenario `{name}` has invalid weight {weight}; weights must be positive and finite")]
    InvalidWeight { name: String, weight: f64 },

    #[error("scenario `{0}` is declared more than once")]
    DuplicateScenario(String),
}
