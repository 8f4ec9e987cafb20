use serde::{Deserialize, Serialize};

/// Identity of a user who completed an OAuth login.
///
/// Embedded in session tokens and returned by `POST /auth/verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Provider-scoped account identifier.
    pub id: String,
    pub email: String,
    pub name: String,
    /// Avatar URL, when the provider supplies one.
    pub picture: Option<String>,
    /// Identity provider name (e.g. `"google"`).
    pub provider: String,
}
