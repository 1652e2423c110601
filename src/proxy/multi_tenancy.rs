use crate::{
    config::Config,
    credentials::{ConnectionCredentialsStore, Vault},
    security::AuthenticationGateway,
};
use reqwest_middleware::ClientWithMiddleware;
use std::sync::Arc;
use tracing::{info, warn};

/// Components of the multi-tenant mode, available only when the identity service, the credentials
/// store, and a valid encryption key are all configured.
#[derive(Clone)]
pub struct MultiTenancy {
    pub gateway: AuthenticationGateway,
    pub vault: Vault,
}

impl MultiTenancy {
    pub fn new(gateway: AuthenticationGateway, vault: Vault) -> Self {
        Self { gateway, vault }
    }

    /// Assembles multi-tenancy components from the config. Returns `None` and logs the reason if
    /// any of the required parts is missing.
    pub fn configure(
        config: &Config,
        store: Option<Arc<dyn ConnectionCredentialsStore>>,
        http_client: ClientWithMiddleware,
    ) -> Option<Self> {
        let Some(gateway) = AuthenticationGateway::from_config(&config.components, http_client)
        else {
            info!("Identity service is not configured, multi-tenant mode is disabled.");
            return None;
        };

        let Some(store) = store else {
            info!("Database is not configured, multi-tenant mode is disabled.");
            return None;
        };

        let vault = Vault::new(&config.security, store);
        if !vault.is_configured() {
            warn!("Encryption key is missing or invalid, multi-tenant mode is disabled.");
            return None;
        }

        Some(Self::new(gateway, vault))
    }
}
