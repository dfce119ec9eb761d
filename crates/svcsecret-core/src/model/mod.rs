// ── Domain model ──
//
// Mode selections, the validated request shapes, and the caller identity.

pub mod identity;
pub mod request;
pub mod selection;

pub use identity::Identity;
pub use request::{ChangeRequest, ServiceAccount};
pub use selection::{Action, Mode, RsaKeySlot, SecretType};
