use serde::Serialize;

/// Who the session runs as. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user: String,
    /// `None` when the session has no active role.
    pub role: Option<String>,
}
