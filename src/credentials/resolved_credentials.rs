use std::fmt::{Debug, Formatter};
use url::Url;

/// Decrypted API key of the automation server. Never printed, serialized or logged.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new<T: Into<String>>(value: T) -> Self {
        Self(value.into())
    }

    /// Returns the plaintext value, used only to build the upstream request.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for ApiKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Describes where resolved credentials come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsSource {
    /// Credentials stored for the verified user.
    User,
    /// Credentials configured by the operator.
    Fallback,
}

/// Connection credentials ready to be used for the upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredentials {
    /// Base URL of the automation server.
    pub server_url: Url,
    /// Decrypted API key of the automation server.
    pub api_key: ApiKey,
    /// Where the credentials come from.
    pub source: CredentialsSource,
}
