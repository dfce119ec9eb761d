use thiserror::Error;

/// Top-level error type for the `svcsecret-api` crate.
///
/// Covers every failure mode of a statement round-trip: authentication,
/// transport, statement execution, and response decoding.
/// `svcsecret-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The warehouse rejected the access token (expired, revoked, wrong type).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The token is valid but the role may not run this statement.
    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    /// The token contains characters that cannot go into an HTTP header.
    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Statement did not finish in time.
    #[error("Statement timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Too many requests. Includes retry-after in seconds when provided.
    #[error("Rate limited -- retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    // ── Statement execution ─────────────────────────────────────────
    /// Structured error returned by the SQL API (compilation, execution).
    #[error("Statement failed ({code}): {message}")]
    Statement {
        code: String,
        sql_state: Option<String>,
        message: String,
    },

    /// Any other non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// The result set does not have the expected shape.
    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),
}
