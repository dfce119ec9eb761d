use secrecy::SecretString;
use serde::Serialize;

use super::selection::{Action, Mode, RsaKeySlot, SecretType};

/// The account being changed and the role that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceAccount {
    pub name: String,
    pub owner_role: String,
}

/// A validated change request.
///
/// Only built by [`ChangeForm::validate()`](crate::ChangeForm::validate), so
/// every required field for the shape is non-empty. Lives for exactly one
/// submission.
#[derive(Debug, Clone)]
pub enum ChangeRequest {
    Disable {
        account: ServiceAccount,
    },
    UpdatePassword {
        account: ServiceAccount,
        password: SecretString,
    },
    UpdateKeypair {
        account: ServiceAccount,
        slot: RsaKeySlot,
        public_key: String,
        /// Recorded in the audit history only; never applied to the user.
        private_key: SecretString,
    },
}

impl ChangeRequest {
    pub fn account(&self) -> &ServiceAccount {
        match self {
            Self::Disable { account }
            | Self::UpdatePassword { account, .. }
            | Self::UpdateKeypair { account, .. } => account,
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Self::Disable { .. } => Mode::Disable,
            Self::UpdatePassword { .. } => Mode::Update(SecretType::Password),
            Self::UpdateKeypair { .. } => Mode::Update(SecretType::Keypair),
        }
    }

    pub fn action(&self) -> Action {
        self.mode().action()
    }

    /// One-line description for logs and confirmations. Never includes secrets.
    pub fn summary(&self) -> String {
        let account = &self.account().name;
        match self {
            Self::Disable { .. } => format!("disable service account {account}"),
            Self::UpdatePassword { .. } => format!("update password of {account}"),
            Self::UpdateKeypair { slot, .. } => {
                format!("update {} of {account}", slot.property())
            }
        }
    }
}
