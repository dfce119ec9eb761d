use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// What to do with the service account.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Action {
    /// Replace the account's password or one of its RSA public keys.
    #[default]
    Update,
    /// Deactivate the account.
    Disable,
}

/// Which credential an update replaces.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum SecretType {
    #[default]
    Password,
    Keypair,
}

/// RSA public key slot on the account record.
///
/// Slot 1 is `RSA_PUBLIC_KEY`, slot 2 is `RSA_PUBLIC_KEY_2`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
pub enum RsaKeySlot {
    #[default]
    #[strum(serialize = "1")]
    #[serde(rename = "1")]
    One,
    #[strum(serialize = "2")]
    #[serde(rename = "2")]
    Two,
}

impl RsaKeySlot {
    /// Name of the user property this slot maps to.
    pub fn property(self) -> &'static str {
        match self {
            Self::One => "RSA_PUBLIC_KEY",
            Self::Two => "RSA_PUBLIC_KEY_2",
        }
    }
}

/// The two mode selections combined.
///
/// A secret type only exists under `Update`, so the "secret type while
/// disabling" state cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Disable,
    Update(SecretType),
}

impl Default for Mode {
    fn default() -> Self {
        Self::Update(SecretType::default())
    }
}

impl Mode {
    /// Combine the Action selection with the (possibly hidden) SecretType
    /// selection. An update with no secret type selected uses the default.
    pub fn from_selection(action: Action, secret_type: Option<SecretType>) -> Self {
        match action {
            Action::Disable => Self::Disable,
            Action::Update => Self::Update(secret_type.unwrap_or_default()),
        }
    }

    pub fn action(self) -> Action {
        match self {
            Self::Disable => Action::Disable,
            Self::Update(_) => Action::Update,
        }
    }

    /// `None` when disabling; the secret type selector is hidden then.
    pub fn secret_type(self) -> Option<SecretType> {
        match self {
            Self::Disable => None,
            Self::Update(kind) => Some(kind),
        }
    }
}
