use crate::{
    config::Config,
    error::Error as FlowgateError,
    proxy::{CredentialsResolver, Forwarder, MultiTenancy},
};

/// Process-wide state shared by all request handlers.
pub struct AppState {
    pub config: Config,
    pub resolver: CredentialsResolver,
    pub forwarder: Forwarder,
}

impl AppState {
    pub fn new(config: Config, resolver: CredentialsResolver, forwarder: Forwarder) -> Self {
        Self {
            config,
            resolver,
            forwarder,
        }
    }

    /// Returns multi-tenancy components or a "not configured" error if the multi-tenant mode is
    /// disabled.
    pub fn multi_tenancy(&self) -> Result<&MultiTenancy, FlowgateError> {
        self.resolver
            .multi_tenancy()
            .ok_or_else(|| FlowgateError::not_configured("Multi-tenant mode is not configured."))
    }
}
