//! Domain logic between `svcsecret-api` and the CLI.
//!
//! - **[`ChangeForm`]**: raw field values as an operator entered them,
//!   including stale values left behind by an earlier selection.
//!   [`ChangeForm::validate()`] runs every rule eagerly and either returns all
//!   [`ValidationIssue`]s or a [`ChangeRequest`].
//!
//! - **[`ChangeRequest`]**: the validated request, one of exactly three
//!   shapes (disable, password update, keypair update). Nothing else can be
//!   submitted.
//!
//! - **[`ProcedureParams`]**: the fixed seven-slot positional tuple the
//!   stored procedure expects, including its `"NULL"` / `"0"` placeholders.
//!
//! - **[`Session`]**: one SQL API connection per run. Looks up the caller's
//!   [`Identity`] and submits a request, classifying the returned status
//!   string into a [`ProcedureOutcome`].

pub mod config;
pub mod error;
pub mod form;
pub mod model;
pub mod procedure;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{AuthCredentials, DEFAULT_OWNER_ROLE, SessionConfig, TlsVerification};
pub use error::CoreError;
pub use form::{ChangeForm, Field, ValidationErrors, ValidationIssue};
pub use model::{Action, ChangeRequest, Identity, Mode, RsaKeySlot, SecretType, ServiceAccount};
pub use procedure::{ProcedureName, ProcedureOutcome, ProcedureParams};
pub use session::Session;
