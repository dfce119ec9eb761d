// ── Runtime session configuration ──
//
// These types describe *how* to reach the warehouse and which procedure to
// call. They carry credential data but never touch disk; the CLI builds a
// `SessionConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::procedure::ProcedureName;

/// Owner role pre-filled on every form.
pub const DEFAULT_OWNER_ROLE: &str = "ACCOUNTADMIN";

/// How to authenticate with the SQL API.
///
/// Carries the actual token; `svcsecret_api::TokenType` is the zero-data
/// marker sent in the token-type header.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// OAuth access token (Snowflake OAuth or an external IdP).
    OAuth(SecretString),
    /// Key-pair JWT, already signed.
    KeypairJwt(SecretString),
    /// Programmatic access token.
    ProgrammaticAccessToken(SecretString),
}

impl AuthCredentials {
    pub(crate) fn to_access_token(&self) -> svcsecret_api::AccessToken {
        use svcsecret_api::{AccessToken, TokenType};
        match self {
            Self::OAuth(t) => AccessToken::new(TokenType::OAuth, t.clone()),
            Self::KeypairJwt(t) => AccessToken::new(TokenType::KeypairJwt, t.clone()),
            Self::ProgrammaticAccessToken(t) => {
                AccessToken::new(TokenType::ProgrammaticAccessToken, t.clone())
            }
        }
    }
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict). Default for hosted accounts.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file (private link behind an inspecting proxy).
    CustomCa(std::path::PathBuf),
    /// Skip verification.
    DangerAcceptInvalid,
}

/// Configuration for one session against one account.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Account URL (e.g., `https://myorg-myacct.snowflakecomputing.com`).
    pub account_url: Url,
    pub auth: AuthCredentials,
    /// Role the statements run under; `None` uses the user's default role.
    pub role: Option<String>,
    pub warehouse: Option<String>,
    pub database: Option<String>,
    pub schema: Option<String>,
    /// Procedure invoked for every change.
    pub procedure: ProcedureName,
    pub tls: TlsVerification,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Server-side statement timeout, also bounding async polling.
    pub statement_timeout: Duration,
}

impl SessionConfig {
    /// Defaults everything except the account URL and credentials.
    pub fn new(account_url: Url, auth: AuthCredentials) -> Self {
        Self {
            account_url,
            auth,
            role: None,
            warehouse: None,
            database: None,
            schema: None,
            procedure: ProcedureName::default(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(60),
            statement_timeout: Duration::from_secs(60),
        }
    }
}
