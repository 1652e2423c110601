use crate::config::{
    AutomationConfig, ComponentsConfig, DatabaseConfig, HttpConfig, SecurityConfig,
};
use figment::{Figment, Metadata, Profile, Provider, providers, providers::Format, value};
use serde_derive::{Deserialize, Serialize};
use url::Url;

/// Raw configuration structure that is used to read the configuration from the file.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RawConfig {
    /// Defines a TCP port to listen on.
    pub port: u16,
    /// External/public URL through which the dashboard is being accessed.
    pub public_url: Url,
    /// Database configuration, the multi-tenant mode is disabled without it.
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

impl RawConfig {
    /// Reads the configuration from the file (TOML) and merges it with the default values.
    pub fn read_from_file(path: &str) -> anyhow::Result<Self> {
        Ok(Figment::from(RawConfig::default())
            .merge(providers::Toml::file(path))
            .merge(providers::Env::prefixed("FLOWGATE_").split("__"))
            .extract()?)
    }
}

impl Default for RawConfig {
    fn default() -> Self {
        let port = 7272;
        Self {
            port,
            public_url: Url::parse(&format!("http://localhost:{port}"))
                .expect("Cannot parse public URL parameter."),
            db: None,
            security: SecurityConfig::default(),
            components: ComponentsConfig::default(),
            automation: AutomationConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Provider for RawConfig {
    fn metadata(&self) -> Metadata {
        Metadata::named("Flowgate main configuration")
    }

    fn data(&self) -> Result<value::Map<Profile, value::Dict>, figment::Error> {
        providers::Serialized::defaults(Self::default()).data()
    }
}
