use serde_derive::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// Metadata of the connection credentials stored for a user. Never includes the secret itself.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ConnectionCredentials {
    /// Unique identifier of the credentials record.
    pub id: Uuid,
    /// Base URL of the user's automation server.
    pub server_url: String,
    /// Indicates whether the record holds an encrypted secret.
    pub has_secret: bool,
    /// Date and time when the record was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Date and time when the record was last updated.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
