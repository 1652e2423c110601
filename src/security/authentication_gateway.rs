use crate::{
    config::ComponentsConfig,
    security::{IdentityVerification, identity_user::IdentityUser},
    users::UserId,
};
use anyhow::Context;
use reqwest_middleware::ClientWithMiddleware;
use tracing::{debug, warn};
use url::Url;

/// Name of the header the identity service expects the project API key in.
const IDENTITY_API_KEY_HEADER: &str = "apikey";

/// Verifies bearer tokens with the external identity service.
#[derive(Clone)]
pub struct AuthenticationGateway {
    identity_url: Url,
    api_key: Option<String>,
    http_client: ClientWithMiddleware,
}

impl AuthenticationGateway {
    /// Creates a gateway for the identity service available at the specified base URL.
    pub fn new(
        mut identity_url: Url,
        api_key: Option<String>,
        http_client: ClientWithMiddleware,
    ) -> Self {
        // Base URL must end with a slash, otherwise the last path segment is lost on join.
        if !identity_url.path().ends_with('/') {
            let path = format!("{}/", identity_url.path());
            identity_url.set_path(&path);
        }

        Self {
            identity_url,
            api_key,
            http_client,
        }
    }

    /// Creates a gateway if the identity service is configured.
    pub fn from_config(
        config: &ComponentsConfig,
        http_client: ClientWithMiddleware,
    ) -> Option<Self> {
        config.identity_url.as_ref().map(|identity_url| {
            Self::new(
                identity_url.clone(),
                config.identity_api_key.clone(),
                http_client,
            )
        })
    }

    /// Verifies the bearer token with a single call to the identity service. Any failure, including
    /// an unreachable service, results in rejection.
    pub async fn verify(&self, token: &str) -> IdentityVerification {
        if token.trim().is_empty() {
            return IdentityVerification::Rejected;
        }

        match self.get_identity_user(token).await {
            Ok(Some(user)) => match UserId::try_from(user.id) {
                Ok(user_id) => IdentityVerification::Verified(user_id),
                Err(err) => {
                    warn!("Identity service returned invalid user: {err:?}");
                    IdentityVerification::Rejected
                }
            },
            Ok(None) => IdentityVerification::Rejected,
            Err(err) => {
                warn!("Failed to verify bearer token with the identity service: {err:?}");
                IdentityVerification::Rejected
            }
        }
    }

    async fn get_identity_user(&self, token: &str) -> anyhow::Result<Option<IdentityUser>> {
        let mut request_builder = self
            .http_client
            .get(self.identity_url.join("user")?)
            .bearer_auth(token);
        if let Some(ref api_key) = self.api_key {
            request_builder = request_builder.header(IDENTITY_API_KEY_HEADER, api_key);
        }

        let response = request_builder
            .send()
            .await
            .with_context(|| "Cannot reach the identity service.")?;
        let status = response.status();
        if !status.is_success() {
            debug!("Identity service rejected bearer token ({status}).");
            return Ok(None);
        }

        response
            .json()
            .await
            .map(Some)
            .with_context(|| "Cannot deserialize identity service user.")
    }
}
