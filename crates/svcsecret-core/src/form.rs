// ── Raw form input and validation ──
//
// `ChangeForm` mirrors the input widgets one-to-one. Fields that are hidden
// by the current mode keep whatever they held before; validation and request
// construction ignore them.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::config::DEFAULT_OWNER_ROLE;
use crate::model::{ChangeRequest, Mode, RsaKeySlot, SecretType, ServiceAccount};

pub const ACCOUNT_NAME_REQUIRED: &str = "Service Account Name is required.";
pub const OWNER_ROLE_REQUIRED: &str = "Service Account Owner Role is required.";
pub const PASSWORD_REQUIRED: &str = "New Password is required for a password update.";
pub const PUBLIC_KEY_REQUIRED: &str = "RSA Public Key is required for a keypair update.";
pub const PRIVATE_KEY_REQUIRED: &str = "RSA Private Key is required for a keypair update.";

/// Input widget a validation message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    AccountName,
    OwnerRole,
    Password,
    PublicKey,
    PrivateKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: Field,
    pub message: &'static str,
}

/// Every rule that failed, in rule order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationIssue>);

impl ValidationErrors {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.0
    }

    pub fn messages(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|i| i.message)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.iter().any(|i| i.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.messages().collect();
        f.write_str(&joined.join(" "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Field values exactly as collected.
#[derive(Debug, Clone)]
pub struct ChangeForm {
    pub mode: Mode,
    pub account_name: String,
    pub owner_role: String,
    pub password: SecretString,
    pub rsa_key_slot: RsaKeySlot,
    pub public_key: String,
    pub private_key: SecretString,
}

impl Default for ChangeForm {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            account_name: String::new(),
            owner_role: DEFAULT_OWNER_ROLE.to_owned(),
            password: empty_secret(),
            rsa_key_slot: RsaKeySlot::default(),
            public_key: String::new(),
            private_key: empty_secret(),
        }
    }
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

impl ChangeForm {
    pub fn new(mode: Mode, account_name: impl Into<String>) -> Self {
        Self {
            mode,
            account_name: account_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_owner_role(mut self, owner_role: impl Into<String>) -> Self {
        self.owner_role = owner_role.into();
        self
    }

    #[must_use]
    pub fn with_password(mut self, password: SecretString) -> Self {
        self.password = password;
        self
    }

    #[must_use]
    pub fn with_keypair(
        mut self,
        slot: RsaKeySlot,
        public_key: impl Into<String>,
        private_key: SecretString,
    ) -> Self {
        self.rsa_key_slot = slot;
        self.public_key = public_key.into();
        self.private_key = private_key;
        self
    }

    /// Run every rule for the active mode. Does not stop at the first failure.
    pub fn issues(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut require = |ok: bool, field: Field, message: &'static str| {
            if !ok {
                issues.push(ValidationIssue { field, message });
            }
        };

        require(
            !self.account_name.is_empty(),
            Field::AccountName,
            ACCOUNT_NAME_REQUIRED,
        );
        require(
            !self.owner_role.is_empty(),
            Field::OwnerRole,
            OWNER_ROLE_REQUIRED,
        );

        match self.mode {
            Mode::Disable => {}
            Mode::Update(SecretType::Password) => {
                require(
                    !self.password.expose_secret().is_empty(),
                    Field::Password,
                    PASSWORD_REQUIRED,
                );
            }
            Mode::Update(SecretType::Keypair) => {
                require(
                    !self.public_key.is_empty(),
                    Field::PublicKey,
                    PUBLIC_KEY_REQUIRED,
                );
                require(
                    !self.private_key.expose_secret().is_empty(),
                    Field::PrivateKey,
                    PRIVATE_KEY_REQUIRED,
                );
            }
        }

        issues
    }

    /// Validate and build the request for the active mode.
    ///
    /// Values of fields hidden by the mode are not carried over.
    pub fn validate(&self) -> Result<ChangeRequest, ValidationErrors> {
        let issues = self.issues();
        if !issues.is_empty() {
            return Err(ValidationErrors(issues));
        }

        let account = ServiceAccount {
            name: self.account_name.clone(),
            owner_role: self.owner_role.clone(),
        };

        Ok(match self.mode {
            Mode::Disable => ChangeRequest::Disable { account },
            Mode::Update(SecretType::Password) => ChangeRequest::UpdatePassword {
                account,
                password: self.password.clone(),
            },
            Mode::Update(SecretType::Keypair) => ChangeRequest::UpdateKeypair {
                account,
                slot: self.rsa_key_slot,
                public_key: self.public_key.clone(),
                private_key: self.private_key.clone(),
            },
        })
    }
}
