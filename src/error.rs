//! Kontragent error types

use std::time::Duration;

/// Kontragent error types
#[derive(Debug, thiserror::Error)]
pub enum KontragentError {
    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A value outside an enumerated domain was passed by the caller.
    ///
    /// This is a contract violation between the router and the library,
    /// never a user-facing condition.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    /// Credentials required by a lookup mode are absent.
    #[error("mode unavailable, missing: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    #[error("configuration error: {0}")]
    Configuration(String),

    // Soft errors
    #[error("empty response from upstream")]
    EmptyResponse,
}

impl KontragentError {
    /// Whether the failure is worth retrying later (network, throttling, 5xx).
    pub fn is_transient(&self) -> bool {
        match self {
            KontragentError::Http(_) | KontragentError::RateLimited { .. } => true,
            KontragentError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Provider `retry-after` hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            KontragentError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for KontragentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            KontragentError::Http(format!("request timed out: {err}"))
        } else if err.is_decode() {
            KontragentError::Http(format!("malformed response body: {err}"))
        } else {
            KontragentError::Http(err.to_string())
        }
    }
}

/// Result type alias for Kontragent operations
pub type Result<T> = std::result::Result<T, KontragentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_names_every_key() {
        let err = KontragentError::MissingCredentials(vec!["DADATA_SECRET_KEY", "OPENAI_API_KEY"]);
        assert_eq!(
            err.to_string(),
            "mode unavailable, missing: DADATA_SECRET_KEY, OPENAI_API_KEY"
        );
    }

    #[test]
    fn transient_classification() {
        assert!(KontragentError::Http("reset".into()).is_transient());
        assert!(KontragentError::RateLimited { retry_after: None }.is_transient());
        assert!(
            KontragentError::Api {
                status: 503,
                message: String::new()
            }
            .is_transient()
        );
        assert!(
            !KontragentError::Api {
                status: 400,
                message: String::new()
            }
            .is_transient()
        );
        assert!(!KontragentError::AuthenticationFailed.is_transient());
    }
}
