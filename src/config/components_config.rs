use serde_derive::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use url::Url;

/// Configuration for the components that are deployed separately.
#[derive(Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ComponentsConfig {
    /// Base URL of the identity service. Bearer tokens are verified with `GET {identity_url}user`.
    /// If not provided, the multi-tenant mode is disabled.
    pub identity_url: Option<Url>,
    /// Optional API key of the identity service, sent along with every verification request.
    pub identity_api_key: Option<String>,
}

impl Debug for ComponentsConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentsConfig")
            .field("identity_url", &self.identity_url.as_ref().map(Url::as_str))
            .field(
                "identity_api_key",
                &self.identity_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}
