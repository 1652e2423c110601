mod automation_config;
mod components_config;
mod database_config;
mod http_config;
mod raw_config;
mod security_config;

use url::Url;

pub use self::{
    automation_config::AutomationConfig,
    components_config::ComponentsConfig,
    database_config::DatabaseConfig,
    http_config::{HttpClientConfig, HttpConfig},
    raw_config::RawConfig,
    security_config::SecurityConfig,
};

/// Main server config.
#[derive(Clone, Debug)]
pub struct Config {
    /// Version of the Flowgate binary.
    pub version: String,
    /// External/public URL through which the dashboard is being accessed.
    pub public_url: Url,
    /// Database configuration, required for the multi-tenant mode.
    pub db: Option<DatabaseConfig>,
    /// Security configuration (encryption key, allowed origins).
    pub security: SecurityConfig,
    /// Configuration for the components that are deployed separately.
    pub components: ComponentsConfig,
    /// Operator-level automation server configuration.
    pub automation: AutomationConfig,
    /// Configuration for the HTTP functionality.
    pub http: HttpConfig,
}

impl AsRef<Config> for Config {
    fn as_ref(&self) -> &Config {
        self
    }
}

impl From<RawConfig> for Config {
    fn from(raw_config: RawConfig) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            public_url: raw_config.public_url,
            db: raw_config.db,
            security: raw_config.security,
            components: raw_config.components,
            automation: raw_config.automation,
            http: raw_config.http,
        }
    }
}
