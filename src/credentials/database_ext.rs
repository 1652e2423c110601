use crate::{
    credentials::{ConnectionCredentialsStore, StoredConnectionCredentials},
    database::Database,
    users::UserId,
};
use futures::{FutureExt, future::BoxFuture};
use sqlx::{FromRow, query, query_as};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct RawConnectionCredentials {
    id: Uuid,
    user_id: String,
    server_url: String,
    encrypted_secret: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<RawConnectionCredentials> for StoredConnectionCredentials {
    type Error = anyhow::Error;

    fn try_from(raw: RawConnectionCredentials) -> Result<Self, Self::Error> {
        Ok(Self {
            id: raw.id,
            user_id: UserId::try_from(raw.user_id)?,
            server_url: raw.server_url,
            encrypted_secret: raw.encrypted_secret,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        })
    }
}

/// Extends the primary database with the connection credentials methods.
impl Database {
    /// Retrieves connection credentials of the user from the `user_connection_credentials` table.
    pub async fn get_connection_credentials(
        &self,
        user_id: &UserId,
    ) -> anyhow::Result<Option<StoredConnectionCredentials>> {
        query_as::<_, RawConnectionCredentials>(
            r#"
SELECT id, user_id, server_url, encrypted_secret, created_at, updated_at
FROM user_connection_credentials
WHERE user_id = $1
            "#,
        )
        .bind(&**user_id)
        .fetch_optional(&self.pool)
        .await?
        .map(StoredConnectionCredentials::try_from)
        .transpose()
    }

    /// Inserts or updates connection credentials of the user. The record keeps its ID and
    /// creation date on update.
    pub async fn upsert_connection_credentials(
        &self,
        user_id: &UserId,
        server_url: &str,
        encrypted_secret: &str,
    ) -> anyhow::Result<StoredConnectionCredentials> {
        let now = OffsetDateTime::now_utc();
        query_as::<_, RawConnectionCredentials>(
            r#"
INSERT INTO user_connection_credentials (id, user_id, server_url, encrypted_secret, created_at, updated_at)
VALUES ($1, $2, $3, $4, $5, $5)
ON CONFLICT(user_id) DO UPDATE SET server_url=excluded.server_url, encrypted_secret=excluded.encrypted_secret, updated_at=excluded.updated_at
RETURNING id, user_id, server_url, encrypted_secret, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&**user_id)
        .bind(server_url)
        .bind(encrypted_secret)
        .bind(now)
        .fetch_one(&self.pool)
        .await?
        .try_into()
    }

    /// Removes connection credentials of the user.
    pub async fn remove_connection_credentials(&self, user_id: &UserId) -> anyhow::Result<()> {
        query(
            r#"
DELETE FROM user_connection_credentials
WHERE user_id = $1
            "#,
        )
        .bind(&**user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl ConnectionCredentialsStore for Database {
    fn load<'a>(
        &'a self,
        user_id: &'a UserId,
    ) -> BoxFuture<'a, anyhow::Result<Option<StoredConnectionCredentials>>> {
        self.get_connection_credentials(user_id).boxed()
    }

    fn upsert<'a>(
        &'a self,
        user_id: &'a UserId,
        server_url: &'a str,
        encrypted_secret: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<StoredConnectionCredentials>> {
        self.upsert_connection_credentials(user_id, server_url, encrypted_secret)
            .boxed()
    }

    fn remove<'a>(&'a self, user_id: &'a UserId) -> BoxFuture<'a, anyhow::Result<()>> {
        self.remove_connection_credentials(user_id).boxed()
    }
}
