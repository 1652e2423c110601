use serde_derive::Deserialize;

/// User returned by the identity service for a valid access token. Only the identifier is used.
#[derive(Debug, PartialEq, Deserialize)]
pub struct IdentityUser {
    /// Unique identifier of the user.
    pub id: String,
}
