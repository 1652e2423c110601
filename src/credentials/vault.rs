use crate::{
    config::SecurityConfig,
    credentials::{
        ApiKey, ConnectionCredentials, ConnectionCredentialsStore, CredentialsEncryption,
        CredentialsError, CredentialsSource, ResolvedCredentials,
    },
    users::UserId,
};
use std::sync::Arc;
use tracing::{debug, error};
use url::Url;

/// Maximum length of the connection secret, in characters.
pub const MAX_SECRET_LENGTH: usize = 500;

/// Encrypts, decrypts, and persists per-user connection credentials.
#[derive(Clone)]
pub struct Vault {
    encryption: Option<CredentialsEncryption>,
    store: Arc<dyn ConnectionCredentialsStore>,
}

impl Vault {
    /// Creates a new vault. Invalid key is reported once, and every cryptographic operation of
    /// such a vault fails with a configuration error.
    pub fn new(config: &SecurityConfig, store: Arc<dyn ConnectionCredentialsStore>) -> Self {
        let encryption =
            config
                .encryption_key
                .as_deref()
                .and_then(|key| match CredentialsEncryption::new(key) {
                    Ok(encryption) => Some(encryption),
                    Err(err) => {
                        error!("Credentials encryption key is invalid: {err:?}");
                        None
                    }
                });

        Self { encryption, store }
    }

    /// Indicates whether the vault has a valid encryption key.
    pub fn is_configured(&self) -> bool {
        self.encryption.is_some()
    }

    /// Encrypts the plaintext with a fresh random IV.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CredentialsError> {
        Ok(self.encryption()?.encrypt(plaintext)?)
    }

    /// Decrypts the payload produced by [`Vault::encrypt`]. Tampered payload and payload encrypted
    /// with another key are reported identically.
    pub fn decrypt(&self, payload: &str) -> Result<String, CredentialsError> {
        self.encryption()?.decrypt(payload).map_err(|err| {
            debug!("Failed to decrypt credentials payload: {err:?}");
            CredentialsError::Integrity
        })
    }

    /// Validates, encrypts, and stores the connection credentials of the user, replacing the
    /// existing ones.
    pub async fn save(
        &self,
        user_id: &UserId,
        server_url: &str,
        secret: &str,
    ) -> Result<ConnectionCredentials, CredentialsError> {
        let server_url = validate_server_url(server_url)?;
        validate_secret(secret)?;

        let encrypted_secret = self.encrypt(secret)?;
        let stored = self
            .store
            .upsert(user_id, server_url.as_str(), &encrypted_secret)
            .await?;

        Ok(stored.into())
    }

    /// Returns metadata of the connection credentials of the user, if any.
    pub async fn get(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ConnectionCredentials>, CredentialsError> {
        Ok(self.store.load(user_id).await?.map(ConnectionCredentials::from))
    }

    /// Returns the decrypted connection credentials of the user, if any.
    pub async fn resolve(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ResolvedCredentials>, CredentialsError> {
        let Some(stored) = self.store.load(user_id).await? else {
            return Ok(None);
        };

        let secret = self.decrypt(&stored.encrypted_secret)?;
        let server_url = Url::parse(&stored.server_url).map_err(|err| {
            debug!(user.id = %user_id, "Stored server URL is not valid: {err:?}");
            CredentialsError::Integrity
        })?;

        Ok(Some(ResolvedCredentials {
            server_url,
            api_key: ApiKey::new(secret),
            source: CredentialsSource::User,
        }))
    }

    /// Removes the connection credentials of the user, if any.
    pub async fn delete(&self, user_id: &UserId) -> Result<(), CredentialsError> {
        Ok(self.store.remove(user_id).await?)
    }

    fn encryption(&self) -> Result<&CredentialsEncryption, CredentialsError> {
        self.encryption
            .as_ref()
            .ok_or(CredentialsError::Configuration)
    }
}

/// Checks that the server URL is an absolute `http` or `https` URL with a host.
pub fn validate_server_url(server_url: &str) -> Result<Url, CredentialsError> {
    let server_url = server_url.trim();
    if server_url.is_empty() {
        return Err(CredentialsError::Validation(
            "Server URL cannot be empty.".to_string(),
        ));
    }

    match Url::parse(server_url) {
        Ok(url)
            if matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty()) =>
        {
            Ok(url)
        }
        _ => Err(CredentialsError::Validation(
            "Server URL must be a valid HTTP or HTTPS URL.".to_string(),
        )),
    }
}

/// Checks that the secret is non-empty, bounded in length, and safe to send as a header value.
pub fn validate_secret(secret: &str) -> Result<(), CredentialsError> {
    if secret.is_empty() {
        return Err(CredentialsError::Validation(
            "Secret cannot be empty.".to_string(),
        ));
    }

    if secret.chars().count() > MAX_SECRET_LENGTH {
        return Err(CredentialsError::Validation(format!(
            "Secret cannot be longer than {MAX_SECRET_LENGTH} characters."
        )));
    }

    if secret.chars().any(char::is_control) {
        return Err(CredentialsError::Validation(
            "Secret cannot contain control characters.".to_string(),
        ));
    }

    Ok(())
}
