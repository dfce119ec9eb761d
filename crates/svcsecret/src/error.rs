//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use svcsecret_config::ConfigError;
use svcsecret_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const PERMISSION: i32 = 5;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(svcsecret::connection_failed),
        help(
            "Check the account URL and your network access.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(svcsecret::auth_failed),
        help(
            "The access token was rejected or has expired.\n\
             Store a fresh one with: svcsecret config set-token"
        )
    )]
    AuthFailed { message: String },

    #[error("No access token configured for profile '{profile}'")]
    #[diagnostic(
        code(svcsecret::no_credentials),
        help(
            "Configure credentials with: svcsecret config init\n\
             Or set the SVCSECRET_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    #[error("Permission denied: {message}")]
    #[diagnostic(
        code(svcsecret::permission_denied),
        help("Check that the session role (--role) may call the procedure.")
    )]
    PermissionDenied { message: String },

    // ── Procedure ────────────────────────────────────────────────────

    /// The call itself failed; no status string came back.
    #[error("An error occurred while calling the stored procedure: {detail}")]
    #[diagnostic(code(svcsecret::procedure_call))]
    ProcedureCall { detail: String, root_exit: i32 },

    /// The procedure ran and reported a failure.
    #[error("Result: {message}")]
    #[diagnostic(code(svcsecret::procedure_rejected))]
    ProcedureRejected { message: String },

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(svcsecret::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(svcsecret::validation))]
    Validation { field: String, reason: String },

    #[error("Submission blocked: {count} required field(s) missing")]
    #[diagnostic(
        code(svcsecret::missing_fields),
        help("Fill in the required fields and try again. Nothing was sent.")
    )]
    MissingFields { count: usize },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(svcsecret::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: svcsecret config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No account configured")]
    #[diagnostic(
        code(svcsecret::no_config),
        help(
            "Create a profile with: svcsecret config init\n\
             Or pass --account-url. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(svcsecret::config))]
    Config(Box<figment::Error>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(svcsecret::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("The interactive form needs a terminal")]
    #[diagnostic(
        code(svcsecret::not_interactive),
        help("Use `svcsecret update` or `svcsecret disable` from scripts.")
    )]
    NotInteractive,

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(svcsecret::timeout),
        help("Increase the timeout with --timeout or check warehouse load.")
    )]
    Timeout { seconds: u64 },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::ProcedureCall { root_exit, .. } => *root_exit,
            Self::ProcedureRejected { .. } => exit_code::REJECTED,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::MissingFields { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::NotInteractive
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::PermissionDenied { message } => CliError::PermissionDenied { message },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::Validation(errors) => CliError::MissingFields {
                count: errors.issues().len(),
            },

            CoreError::ProcedureCall(inner) => {
                let detail = inner.to_string();
                let root_exit = CliError::from(*inner).exit_code();
                CliError::ProcedureCall { detail, root_exit }
            }

            CoreError::Statement { code, message } => CliError::ApiError { code, message },

            CoreError::UnexpectedResult(message) => CliError::ApiError {
                code: "unexpected_result".into(),
                message,
            },

            CoreError::Api { message, status } => CliError::ApiError {
                code: status.map_or_else(|| "unknown".into(), |s| s.to_string()),
                message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Serialization(e) => CliError::Validation {
                field: "config".into(),
                reason: e.to_string(),
            },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
