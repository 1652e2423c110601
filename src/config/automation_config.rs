use serde_derive::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use url::Url;

/// Name of the header the automation server expects its API key in.
const DEFAULT_API_KEY_HEADER: &str = "X-N8N-API-KEY";

/// Operator-level configuration of the automation server. When both `url` and `api_key` are
/// provided, requests that cannot be served with per-user credentials fall back to them.
#[derive(Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AutomationConfig {
    /// Base URL of the fallback automation server.
    pub url: Option<Url>,
    /// API key of the fallback automation server.
    pub api_key: Option<String>,
    /// Name of the header used to pass the API key to the automation server.
    pub api_key_header: String,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
        }
    }
}

impl Debug for AutomationConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomationConfig")
            .field("url", &self.url.as_ref().map(Url::as_str))
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_key_header", &self.api_key_header)
            .finish()
    }
}
