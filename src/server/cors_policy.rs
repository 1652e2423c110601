use crate::config::Config;
use std::collections::HashSet;
use url::Url;

/// Set of origins allowed to make cross-origin requests: the origins configured by the operator
/// and the origin of the deployment itself.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: HashSet<String>,
}

impl CorsPolicy {
    pub fn new(config: &Config) -> Self {
        let allowed_origins = config
            .security
            .allowed_origins
            .iter()
            .filter_map(|origin| normalize_origin(origin))
            .chain([config.public_url.origin().ascii_serialization()])
            .filter(|origin| origin != "null")
            .collect();

        Self { allowed_origins }
    }

    /// Checks whether the value of the `Origin` header is on the allow-list. Comparison is exact.
    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.contains(origin)
    }
}

/// Normalizes configured origin to its ASCII serialization (`scheme://host[:port]`).
fn normalize_origin(origin: &str) -> Option<String> {
    let origin = origin.trim();
    if origin.is_empty() {
        return None;
    }

    Some(match Url::parse(origin) {
        Ok(url) => url.origin().ascii_serialization(),
        Err(_) => origin.trim_end_matches('/').to_string(),
    })
}
