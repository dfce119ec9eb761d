use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

const TOKEN_TYPE_HEADER: &str = "x-snowflake-authorization-token-type";

/// Which kind of bearer token is presented to the SQL API.
///
/// The SQL API needs to be told explicitly; it does not sniff the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenType {
    /// OAuth access token issued by an external or Snowflake OAuth server.
    #[default]
    OAuth,
    /// Key-pair JWT signed with the user's RSA private key.
    KeypairJwt,
    /// Programmatic access token generated for the user.
    ProgrammaticAccessToken,
}

impl TokenType {
    /// Value for the `X-Snowflake-Authorization-Token-Type` header.
    pub fn header_value(self) -> &'static str {
        match self {
            Self::OAuth => "OAUTH",
            Self::KeypairJwt => "KEYPAIR_JWT",
            Self::ProgrammaticAccessToken => "PROGRAMMATIC_ACCESS_TOKEN",
        }
    }
}

/// An already-issued access token. This crate never mints tokens.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub kind: TokenType,
    pub secret: SecretString,
}

impl AccessToken {
    pub fn new(kind: TokenType, secret: SecretString) -> Self {
        Self { kind, secret }
    }

    /// Default headers carrying this token on every request.
    pub fn headers(&self) -> Result<HeaderMap, Error> {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", self.secret.expose_secret()))
            .map_err(|_| Error::InvalidToken("token contains non-header characters".into()))?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(
            HeaderName::from_static(TOKEN_TYPE_HEADER),
            HeaderValue::from_static(self.kind.header_value()),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}
