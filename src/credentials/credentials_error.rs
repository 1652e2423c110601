/// Represents possible errors that can happen while storing or resolving connection credentials.
#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    /// The encryption key is missing or invalid, no cryptographic operation was attempted.
    #[error("Credentials encryption is not configured.")]
    Configuration,
    /// The provided credentials are invalid, the message is safe to show to the client.
    #[error("{0}")]
    Validation(String),
    /// The stored credentials are corrupted or were encrypted with a different key.
    #[error("Stored credentials cannot be decrypted.")]
    Integrity,
    /// The credentials store or the cryptographic backend failed.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
