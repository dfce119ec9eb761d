// ── Core error types ──
//
// User-facing errors from svcsecret-core. Consumers never see HTTP status
// codes or JSON parse failures directly: `From<svcsecret_api::Error>`
// translates transport-layer errors into domain variants.

use thiserror::Error;

use crate::form::ValidationErrors;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Request errors ───────────────────────────────────────────────
    /// Required fields missing for the selected mode. Nothing was sent.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// The procedure call itself failed; no status string came back.
    #[error("An error occurred while calling the stored procedure: {0}")]
    ProcedureCall(Box<CoreError>),

    #[error("Statement failed ({code}): {message}")]
    Statement { code: String, message: String },

    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// The innermost error, unwrapping `ProcedureCall`.
    pub fn root(&self) -> &CoreError {
        match self {
            Self::ProcedureCall(inner) => inner.root(),
            other => other,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<svcsecret_api::Error> for CoreError {
    fn from(err: svcsecret_api::Error) -> Self {
        use svcsecret_api::Error as ApiError;

        match err {
            ApiError::Authentication { message } => CoreError::AuthenticationFailed { message },
            ApiError::InvalidToken(message) => CoreError::AuthenticationFailed { message },
            ApiError::PermissionDenied { message } => CoreError::PermissionDenied { message },
            ApiError::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            ApiError::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ApiError::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            ApiError::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            ApiError::RateLimited { retry_after_secs } => CoreError::Api {
                message: format!("Rate limited -- retry after {retry_after_secs}s"),
                status: Some(429),
            },
            ApiError::Statement { code, message, .. } => CoreError::Statement { code, message },
            ApiError::Http { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            ApiError::Deserialization { message, body: _ } => {
                CoreError::UnexpectedResult(format!("Deserialization error: {message}"))
            }
            ApiError::UnexpectedResult(message) => CoreError::UnexpectedResult(message),
        }
    }
}
