use std::time::Duration;

/// Default engine address for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Errors from reading the dashboard configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

/// Dashboard configuration loaded from environment variables.
///
/// Poll intervals are fixed by the engine contract and are not
/// configurable here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Base URL of the workflow engine.
    pub api_url: String,
    /// Timeout applied to every HTTP request.
    pub request_timeout: Duration,
}

impl DashboardConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `WORKFLOW_API_URL`     | `http://localhost:8000` |
    /// | `REQUEST_TIMEOUT_SECS` | `10`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable
    /// source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = match lookup("WORKFLOW_API_URL") {
            Some(v) if v.trim().is_empty() => {
                return Err(ConfigError::Empty {
                    var: "WORKFLOW_API_URL",
                })
            }
            Some(v) => v.trim().to_string(),
            None => DEFAULT_API_URL.to_string(),
        };

        let request_timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(v) => match v.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        var: "REQUEST_TIMEOUT_SECS",
                        value: v,
                    })
                }
            },
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            api_url,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}
