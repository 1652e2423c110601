use serde_derive::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

/// Security configuration (credentials encryption, cross-origin access).
#[derive(Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SecurityConfig {
    /// Hex-encoded 32-byte key used to encrypt stored connection credentials. If not provided or
    /// invalid, connection credentials can neither be stored nor decrypted.
    pub encryption_key: Option<String>,
    /// Origins that are allowed to access the API from the browser, in addition to the origin of
    /// the public URL.
    pub allowed_origins: Vec<String>,
}

impl Debug for SecurityConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field(
                "encryption_key",
                &self.encryption_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("allowed_origins", &self.allowed_origins)
            .finish()
    }
}
