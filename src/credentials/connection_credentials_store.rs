use crate::{credentials::ConnectionCredentials, users::UserId};
use futures::future::BoxFuture;
use time::OffsetDateTime;
use uuid::Uuid;

/// Connection credentials record as it's kept in the store, the secret is encrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredConnectionCredentials {
    pub id: Uuid,
    pub user_id: UserId,
    pub server_url: String,
    pub encrypted_secret: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<StoredConnectionCredentials> for ConnectionCredentials {
    fn from(stored: StoredConnectionCredentials) -> Self {
        Self {
            id: stored.id,
            server_url: stored.server_url,
            has_secret: !stored.encrypted_secret.is_empty(),
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }
}

/// Persistent store for the per-user connection credentials. Implementations must keep at most
/// one record per user and make both upsert and removal atomic.
pub trait ConnectionCredentialsStore: Send + Sync {
    /// Loads the credentials record of the specified user, if any.
    fn load<'a>(
        &'a self,
        user_id: &'a UserId,
    ) -> BoxFuture<'a, anyhow::Result<Option<StoredConnectionCredentials>>>;

    /// Inserts the credentials record for the user or replaces the existing one in place.
    fn upsert<'a>(
        &'a self,
        user_id: &'a UserId,
        server_url: &'a str,
        encrypted_secret: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<StoredConnectionCredentials>>;

    /// Removes the credentials record of the user. Removing a missing record is not an error.
    fn remove<'a>(&'a self, user_id: &'a UserId) -> BoxFuture<'a, anyhow::Result<()>>;
}

#[cfg(test)]
mod tests {
    use super::StoredConnectionCredentials;
    use crate::{credentials::ConnectionCredentials, users::UserId};
    use time::OffsetDateTime;
    use uuid::uuid;

    #[test]
    fn converts_to_metadata() -> anyhow::Result<()> {
        let stored = StoredConnectionCredentials {
            id: uuid!("00000000-0000-0000-0000-000000000001"),
            user_id: UserId::try_from("user-1")?,
            server_url: "https://n8n.flowgate.dev/".to_string(),
            encrypted_secret: "c2VjcmV0".to_string(),
            created_at: OffsetDateTime::from_unix_timestamp(946720800)?,
            updated_at: OffsetDateTime::from_unix_timestamp(946724400)?,
        };

        let credentials = ConnectionCredentials::from(stored.clone());
        assert_eq!(credentials.id, stored.id);
        assert_eq!(credentials.server_url, stored.server_url);
        assert!(credentials.has_secret);
        assert_eq!(credentials.created_at, stored.created_at);
        assert_eq!(credentials.updated_at, stored.updated_at);

        let credentials = ConnectionCredentials::from(StoredConnectionCredentials {
            encrypted_secret: String::new(),
            ..stored
        });
        assert!(!credentials.has_secret);

        Ok(())
    }
}
