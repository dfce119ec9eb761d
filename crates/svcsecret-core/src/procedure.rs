// ── Stored procedure binding ──
//
// The procedure signature is fixed and owned elsewhere: seven TEXT
// arguments, unused ones filled with the literal placeholders "NULL" and
// "0". Placeholders are produced here and nowhere else.

use std::fmt;
use std::str::FromStr;

use secrecy::ExposeSecret;
use serde::Serialize;
use svcsecret_api::Binding;

use crate::error::CoreError;
use crate::model::ChangeRequest;

pub const DEFAULT_PROCEDURE: &str =
    "UTILS_DB.ACCOUNTADMIN_UTILS.CHANGE_SERVICE_ACCOUNT_SECRET_PROC";

/// Placeholder for unused string arguments.
pub const NULL_PLACEHOLDER: &str = "NULL";
/// Placeholder for an unused RSA key slot.
pub const NO_SLOT_PLACEHOLDER: &str = "0";

const ARITY: usize = 7;
const REDACTED: &str = "********";

/// Substring of the returned status that marks success.
const SUCCESS_MARKER: &str = "SUCCESS";

// ── Procedure name ──────────────────────────────────────────────────

/// Fully-qualified procedure name (`[DB.][SCHEMA.]NAME`).
///
/// Interpolated into the statement text, so it is restricted to unquoted
/// identifier characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureName(String);

impl ProcedureName {
    /// `CALL <name>(?, ?, ?, ?, ?, ?, ?)`
    pub fn call_statement(&self) -> String {
        let placeholders = vec!["?"; ARITY].join(", ");
        format!("CALL {}({placeholders})", self.0)
    }
}

impl Default for ProcedureName {
    fn default() -> Self {
        Self(DEFAULT_PROCEDURE.to_owned())
    }
}

impl FromStr for ProcedureName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        let valid_part = |p: &&str| {
            let mut chars = p.chars();
            chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        };

        if parts.len() > 3 || !parts.iter().all(valid_part) {
            return Err(CoreError::Config {
                message: format!(
                    "invalid procedure name '{s}': expected [DATABASE.][SCHEMA.]NAME \
                     with letters, digits, '_' or '$'"
                ),
            });
        }
        Ok(Self(s.to_owned()))
    }
}

impl fmt::Display for ProcedureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Positional parameters ───────────────────────────────────────────

/// The seven positional arguments, in call order:
/// `action, account_name, owner_role, secret_type, secret_value_1,
/// secret_value_2, rsa_key_slot`.
#[derive(Clone)]
pub struct ProcedureParams {
    values: [String; ARITY],
    secret: [bool; ARITY],
}

impl ProcedureParams {
    pub fn from_request(request: &ChangeRequest) -> Self {
        let account = request.account();
        let action = request.action().to_string();
        let null = || NULL_PLACEHOLDER.to_owned();

        let (secret_type, value_1, value_2, slot, secret_1) = match request {
            ChangeRequest::Disable { .. } => {
                (null(), null(), null(), NO_SLOT_PLACEHOLDER.to_owned(), false)
            }
            ChangeRequest::UpdatePassword { password, .. } => (
                "PASSWORD".to_owned(),
                password.expose_secret().to_owned(),
                null(),
                NO_SLOT_PLACEHOLDER.to_owned(),
                true,
            ),
            ChangeRequest::UpdateKeypair {
                slot,
                public_key,
                private_key,
                ..
            } => (
                "KEYPAIR".to_owned(),
                public_key.clone(),
                private_key.expose_secret().to_owned(),
                slot.to_string(),
                false,
            ),
        };
        let secret_2 = matches!(request, ChangeRequest::UpdateKeypair { .. });

        Self {
            values: [
                action,
                account.name.clone(),
                account.owner_role.clone(),
                secret_type,
                value_1,
                value_2,
                slot,
            ],
            secret: [false, false, false, false, secret_1, secret_2, false],
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.values
    }

    /// Values safe to print: secret slots replaced with a mask.
    pub fn redacted(&self) -> Vec<String> {
        self.values
            .iter()
            .zip(self.secret)
            .map(|(v, secret)| if secret { REDACTED.to_owned() } else { v.clone() })
            .collect()
    }

    pub fn to_bindings(&self) -> Vec<Binding> {
        self.values.iter().map(|v| Binding::text(v.as_str())).collect()
    }
}

impl fmt::Debug for ProcedureParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.redacted()).finish()
    }
}

// ── Outcome ─────────────────────────────────────────────────────────

/// The procedure's status string, classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum ProcedureOutcome {
    Success(String),
    Failure(String),
}

impl ProcedureOutcome {
    /// Anything containing `SUCCESS` is a success; everything else is shown
    /// verbatim as a failure.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains(SUCCESS_MARKER) {
            Self::Success(message)
        } else {
            Self::Failure(message)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success(m) | Self::Failure(m) => m,
        }
    }
}
