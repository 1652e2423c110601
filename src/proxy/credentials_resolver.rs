use crate::{
    config::AutomationConfig,
    credentials::{ApiKey, CredentialsError, CredentialsSource, ResolvedCredentials},
    proxy::MultiTenancy,
    security::IdentityVerification,
};
use tracing::{debug, error, warn};

/// Resolves connection credentials for the proxied request: per-user credentials first, then the
/// operator-configured fallback.
pub struct CredentialsResolver {
    multi_tenancy: Option<MultiTenancy>,
    fallback: Option<ResolvedCredentials>,
}

impl CredentialsResolver {
    pub fn new(config: &AutomationConfig, multi_tenancy: Option<MultiTenancy>) -> Self {
        let fallback = match (&config.url, &config.api_key) {
            (Some(server_url), Some(api_key)) if !api_key.is_empty() => {
                Some(ResolvedCredentials {
                    server_url: server_url.clone(),
                    api_key: ApiKey::new(api_key.as_str()),
                    source: CredentialsSource::Fallback,
                })
            }
            _ => None,
        };

        Self {
            multi_tenancy,
            fallback,
        }
    }

    /// Returns multi-tenancy components, if the multi-tenant mode is enabled.
    pub fn multi_tenancy(&self) -> Option<&MultiTenancy> {
        self.multi_tenancy.as_ref()
    }

    /// Indicates whether the operator-configured fallback credentials are available.
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Resolves credentials for the request with the optional bearer token. Any failure on the
    /// multi-tenant path falls through to the fallback credentials.
    pub async fn resolve(&self, bearer_token: Option<&str>) -> Option<ResolvedCredentials> {
        if let Some(credentials) = self.resolve_user_credentials(bearer_token).await {
            return Some(credentials);
        }

        self.fallback.clone()
    }

    async fn resolve_user_credentials(
        &self,
        bearer_token: Option<&str>,
    ) -> Option<ResolvedCredentials> {
        let (Some(multi_tenancy), Some(bearer_token)) = (&self.multi_tenancy, bearer_token) else {
            return None;
        };

        let IdentityVerification::Verified(user_id) =
            multi_tenancy.gateway.verify(bearer_token).await
        else {
            debug!("Bearer token is rejected, trying fallback credentials.");
            return None;
        };

        match multi_tenancy.vault.resolve(&user_id).await {
            Ok(Some(credentials)) => Some(credentials),
            Ok(None) => {
                debug!(user.id = %user_id, "User has no connection credentials, trying fallback credentials.");
                None
            }
            Err(CredentialsError::Integrity) => {
                error!(user.id = %user_id, "User connection credentials cannot be decrypted, trying fallback credentials.");
                None
            }
            Err(err) => {
                warn!(user.id = %user_id, "Failed to resolve user connection credentials, trying fallback credentials: {err:?}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CredentialsResolver;
    use crate::{
        config::AutomationConfig,
        credentials::CredentialsSource,
        tests::{MockCredentialsStore, mock_multi_tenancy},
        users::UserId,
    };
    use httpmock::{Mock, MockServer};
    use serde_json::json;
    use std::sync::Arc;
    use url::Url;

    fn fallback_config() -> anyhow::Result<AutomationConfig> {
        Ok(AutomationConfig {
            url: Some(Url::parse("https://fallback.flowgate.dev")?),
            api_key: Some("fallback-api-key".to_string()),
            ..Default::default()
        })
    }

    fn mock_identity_user<'a>(identity_server: &'a MockServer, token: &str, user_id: &str) -> Mock<'a> {
        identity_server.mock(|when, then| {
            when.method(httpmock::Method::GET)
                .path("/user")
                .header("authorization", format!("Bearer {token}"));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({ "id": user_id }));
        })
    }

    #[tokio::test]
    async fn fails_without_any_credentials() -> anyhow::Result<()> {
        let resolver = CredentialsResolver::new(&AutomationConfig::default(), None);
        assert!(!resolver.has_fallback());
        assert!(resolver.multi_tenancy().is_none());
        assert!(resolver.resolve(None).await.is_none());
        assert!(resolver.resolve(Some("token")).await.is_none());

        // Both URL and API key are required for fallback.
        let resolver = CredentialsResolver::new(
            &AutomationConfig {
                api_key: None,
                ..fallback_config()?
            },
            None,
        );
        assert!(!resolver.has_fallback());

        let resolver = CredentialsResolver::new(
            &AutomationConfig {
                url: None,
                ..fallback_config()?
            },
            None,
        );
        assert!(!resolver.has_fallback());

        Ok(())
    }

    #[tokio::test]
    async fn uses_fallback_credentials() -> anyhow::Result<()> {
        let resolver = CredentialsResolver::new(&fallback_config()?, None);
        assert!(resolver.has_fallback());

        for token in [None, Some("token")] {
            let credentials = resolver
                .resolve(token)
                .await
                .expect("Fallback credentials should be resolved.");
            assert_eq!(
                credentials.server_url.as_str(),
                "https://fallback.flowgate.dev/"
            );
            assert_eq!(credentials.api_key.expose(), "fallback-api-key");
            assert_eq!(credentials.source, CredentialsSource::Fallback);
        }

        Ok(())
    }

    #[tokio::test]
    async fn prefers_user_credentials_over_fallback() -> anyhow::Result<()> {
        let identity_server = MockServer::start();
        let user_mock = mock_identity_user(&identity_server, "user-token", "user-1");

        let store = Arc::new(MockCredentialsStore::new());
        let multi_tenancy = mock_multi_tenancy(&identity_server.base_url(), store.clone())?;
        multi_tenancy
            .vault
            .save(
                &UserId::try_from("user-1")?,
                "https://user.flowgate.dev",
                "user-api-key",
            )
            .await?;

        let resolver = CredentialsResolver::new(&fallback_config()?, Some(multi_tenancy));
        let credentials = resolver
            .resolve(Some("user-token"))
            .await
            .expect("User credentials should be resolved.");

        user_mock.assert();
        assert_eq!(credentials.server_url.as_str(), "https://user.flowgate.dev/");
        assert_eq!(credentials.api_key.expose(), "user-api-key");
        assert_eq!(credentials.source, CredentialsSource::User);

        // Without a token, the fallback is used.
        let credentials = resolver
            .resolve(None)
            .await
            .expect("Fallback credentials should be resolved.");
        assert_eq!(credentials.source, CredentialsSource::Fallback);

        Ok(())
    }

    #[tokio::test]
    async fn falls_through_when_user_has_no_credentials() -> anyhow::Result<()> {
        let identity_server = MockServer::start();
        let user_mock = mock_identity_user(&identity_server, "user-token", "user-1");

        let store = Arc::new(MockCredentialsStore::new());
        let resolver = CredentialsResolver::new(
            &fallback_config()?,
            Some(mock_multi_tenancy(&identity_server.base_url(), store.clone())?),
        );
        let credentials = resolver
            .resolve(Some("user-token"))
            .await
            .expect("Fallback credentials should be resolved.");
        user_mock.assert();
        assert_eq!(credentials.source, CredentialsSource::Fallback);

        let resolver = CredentialsResolver::new(
            &AutomationConfig::default(),
            Some(mock_multi_tenancy(&identity_server.base_url(), store)?),
        );
        assert!(resolver.resolve(Some("user-token")).await.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn falls_through_when_token_is_rejected() -> anyhow::Result<()> {
        let identity_server = MockServer::start();
        let user_mock = identity_server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/user");
            then.status(401)
                .header("Content-Type", "application/json")
                .json_body(json!({ "message": "invalid JWT" }));
        });

        let store = Arc::new(MockCredentialsStore::new());
        let multi_tenancy = mock_multi_tenancy(&identity_server.base_url(), store)?;
        multi_tenancy
            .vault
            .save(
                &UserId::try_from("user-1")?,
                "https://user.flowgate.dev",
                "user-api-key",
            )
            .await?;

        let resolver = CredentialsResolver::new(&fallback_config()?, Some(multi_tenancy));
        let credentials = resolver
            .resolve(Some("forged-token"))
            .await
            .expect("Fallback credentials should be resolved.");
        user_mock.assert();
        assert_eq!(credentials.source, CredentialsSource::Fallback);

        Ok(())
    }

    #[tokio::test]
    async fn falls_through_when_identity_service_is_unreachable() -> anyhow::Result<()> {
        let store = Arc::new(MockCredentialsStore::new());
        let resolver = CredentialsResolver::new(
            &fallback_config()?,
            Some(mock_multi_tenancy("http://127.0.0.1:1/", store)?),
        );

        let credentials = resolver
            .resolve(Some("user-token"))
            .await
            .expect("Fallback credentials should be resolved.");
        assert_eq!(credentials.source, CredentialsSource::Fallback);

        Ok(())
    }

    #[tokio::test]
    async fn falls_through_when_record_is_tampered() -> anyhow::Result<()> {
        let identity_server = MockServer::start();
        let user_mock = mock_identity_user(&identity_server, "user-token", "user-1");

        let user_id = UserId::try_from("user-1")?;
        let store = Arc::new(MockCredentialsStore::new());
        let multi_tenancy = mock_multi_tenancy(&identity_server.base_url(), store.clone())?;
        multi_tenancy
            .vault
            .save(&user_id, "https://user.flowgate.dev", "user-api-key")
            .await?;
        store.tamper(&user_id, |record| {
            record.encrypted_secret = "dGFtcGVyZWQtcGF5bG9hZC10aGF0LWlzLWxvbmctZW5vdWdo".to_string();
        });

        let resolver = CredentialsResolver::new(&AutomationConfig::default(), Some(multi_tenancy));
        assert!(resolver.resolve(Some("user-token")).await.is_none());
        user_mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn falls_through_when_store_is_unavailable() -> anyhow::Result<()> {
        let identity_server = MockServer::start();
        let user_mock = mock_identity_user(&identity_server, "user-token", "user-1");

        let resolver = CredentialsResolver::new(
            &fallback_config()?,
            Some(mock_multi_tenancy(
                &identity_server.base_url(),
                Arc::new(MockCredentialsStore::unavailable()),
            )?),
        );
        let credentials = resolver
            .resolve(Some("user-token"))
            .await
            .expect("Fallback credentials should be resolved.");
        user_mock.assert();
        assert_eq!(credentials.source, CredentialsSource::Fallback);

        Ok(())
    }
}
