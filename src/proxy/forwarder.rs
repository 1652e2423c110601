use crate::{
    config::AutomationConfig,
    credentials::ResolvedCredentials,
    proxy::{UpstreamOutcome, UpstreamRequest},
};
use anyhow::{Context, anyhow};
use reqwest::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use serde::de::IgnoredAny;
use tracing::{error, warn};
use url::Url;

/// Replays inbound requests against the automation server with the injected secret header.
#[derive(Clone)]
pub struct Forwarder {
    api_key_header: HeaderName,
    http_client: ClientWithMiddleware,
}

impl Forwarder {
    /// Creates a forwarder that injects the API key with the configured header name.
    pub fn new(config: &AutomationConfig, http_client: ClientWithMiddleware) -> anyhow::Result<Self> {
        Ok(Self {
            api_key_header: HeaderName::from_bytes(config.api_key_header.as_bytes()).with_context(
                || format!("Invalid API key header name: {}.", config.api_key_header),
            )?,
            http_client,
        })
    }

    /// Builds the upstream request: the upstream URL, the secret header, the JSON content type,
    /// and the body for the methods that carry one.
    pub fn prepare_request(
        &self,
        credentials: &ResolvedCredentials,
        request: &UpstreamRequest,
    ) -> anyhow::Result<RequestBuilder> {
        let url = upstream_url(&credentials.server_url, request)?;

        let mut api_key = HeaderValue::from_str(credentials.api_key.expose())
            .map_err(|_| anyhow!("API key cannot be used as a header value."))?;
        api_key.set_sensitive(true);

        let request_builder = self
            .http_client
            .request(request.method.clone(), url)
            .header(self.api_key_header.clone(), api_key)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(match request.body {
            Some(ref body) => request_builder.body(
                serde_json::to_vec(body).with_context(|| "Cannot serialize request body.")?,
            ),
            None => request_builder,
        })
    }

    /// Forwards the request upstream. Every failure is reported as unreachable upstream, the
    /// cause is only logged.
    pub async fn forward(
        &self,
        credentials: &ResolvedCredentials,
        request: &UpstreamRequest,
    ) -> UpstreamOutcome {
        let request_builder = match self.prepare_request(credentials, request) {
            Ok(request_builder) => request_builder,
            Err(err) => {
                error!("Failed to prepare automation server request: {err:?}");
                return UpstreamOutcome::Unreachable;
            }
        };

        let response = match request_builder.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    method = %request.method,
                    "Failed to reach automation server: {err:?}"
                );
                return UpstreamOutcome::Unreachable;
            }
        };

        let status = response.status().as_u16();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => {
                warn!(status, "Failed to read automation server response: {err:?}");
                return UpstreamOutcome::Unreachable;
            }
        };

        if body.iter().all(u8::is_ascii_whitespace) {
            return UpstreamOutcome::Response { status, body: None };
        }

        if let Err(err) = serde_json::from_slice::<IgnoredAny>(&body) {
            warn!(status, "Automation server returned non-JSON response: {err}");
            return UpstreamOutcome::Unreachable;
        }

        UpstreamOutcome::Response {
            status,
            body: Some(body),
        }
    }
}

/// Appends request path segments and query to the automation server base URL.
fn upstream_url(server_url: &Url, request: &UpstreamRequest) -> anyhow::Result<Url> {
    let mut url = server_url.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("Automation server URL cannot be a base URL."))?
        .pop_if_empty()
        .extend(&request.segments);
    url.set_query(request.query.as_deref());
    url.set_fragment(None);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::{Forwarder, upstream_url};
    use crate::{
        config::{AutomationConfig, HttpClientConfig},
        credentials::{ApiKey, CredentialsSource, ResolvedCredentials},
        network::create_http_client,
        proxy::{UpstreamOutcome, UpstreamRequest},
    };
    use bytes::Bytes;
    use httpmock::MockServer;
    use serde_json::json;
    use url::Url;

    fn mock_credentials(server_url: &str) -> anyhow::Result<ResolvedCredentials> {
        Ok(ResolvedCredentials {
            server_url: Url::parse(server_url)?,
            api_key: ApiKey::new("n8n-api-key"),
            source: CredentialsSource::User,
        })
    }

    fn mock_forwarder() -> anyhow::Result<Forwarder> {
        Forwarder::new(
            &AutomationConfig::default(),
            create_http_client(&HttpClientConfig::default())?,
        )
    }

    #[test]
    fn builds_upstream_url() -> anyhow::Result<()> {
        let request = UpstreamRequest::new("GET", "api/v1/workflows", "active=true", b"")?;
        for (server_url, expected_url) in [
            (
                "https://host",
                "https://host/api/v1/workflows?active=true",
            ),
            (
                "https://host/",
                "https://host/api/v1/workflows?active=true",
            ),
            (
                "https://host:8443/path",
                "https://host:8443/path/api/v1/workflows?active=true",
            ),
            (
                "https://host:8443/path/?internal=1#fragment",
                "https://host:8443/path/api/v1/workflows?active=true",
            ),
        ] {
            assert_eq!(
                upstream_url(&Url::parse(server_url)?, &request)?.as_str(),
                expected_url
            );
        }

        let request = UpstreamRequest::new("GET", "api/v1/a%2Fb/x%25y", "", b"")?;
        assert_eq!(
            upstream_url(&Url::parse("https://host")?, &request)?.as_str(),
            "https://host/api/v1/a%2Fb/x%25y"
        );

        let request = UpstreamRequest::new("GET", "api/v1/work flows?", "", b"")?;
        assert_eq!(
            upstream_url(&Url::parse("https://host")?, &request)?.as_str(),
            "https://host/api/v1/work%20flows%3F"
        );

        Ok(())
    }

    #[test]
    fn rejects_invalid_header_name() -> anyhow::Result<()> {
        assert!(
            Forwarder::new(
                &AutomationConfig {
                    api_key_header: "X API KEY".to_string(),
                    ..Default::default()
                },
                create_http_client(&HttpClientConfig::default())?,
            )
            .is_err()
        );

        Ok(())
    }

    #[tokio::test]
    async fn forwards_get_requests_without_body() -> anyhow::Result<()> {
        let automation_server = MockServer::start();
        let workflows_mock = automation_server.mock(|when, then| {
            when.method(httpmock::Method::GET)
                .path("/api/v1/workflows")
                .query_param("active", "true")
                .header("x-n8n-api-key", "n8n-api-key")
                .header("content-type", "application/json")
                .header_missing("authorization")
                .body("");
            then.status(200)
                .header("Content-Type", "application/json")
                .body(r#"{"data":[],"nextCursor":null}"#);
        });

        let outcome = mock_forwarder()?
            .forward(
                &mock_credentials(&automation_server.base_url())?,
                &UpstreamRequest::new("GET", "api/v1/workflows", "active=true", b"ignored")?,
            )
            .await;

        workflows_mock.assert();
        assert_eq!(
            outcome,
            UpstreamOutcome::Response {
                status: 200,
                body: Some(Bytes::from_static(br#"{"data":[],"nextCursor":null}"#)),
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn forwards_post_requests_with_json_body() -> anyhow::Result<()> {
        let automation_server = MockServer::start();
        let activate_mock = automation_server.mock(|when, then| {
            when.method(httpmock::Method::POST)
                .path("/api/v1/workflows/1/activate")
                .header("x-n8n-api-key", "n8n-api-key")
                .header("content-type", "application/json")
                .header_missing("authorization")
                .json_body(json!({ "a": 1 }));
            then.status(201)
                .header("Content-Type", "application/json")
                .body(r#"{"id":"1","active":true}"#);
        });

        let outcome = mock_forwarder()?
            .forward(
                &mock_credentials(&automation_server.base_url())?,
                &UpstreamRequest::new("POST", "api/v1/workflows/1/activate", "", br#"{"a":1}"#)?,
            )
            .await;

        activate_mock.assert();
        assert_eq!(
            outcome,
            UpstreamOutcome::Response {
                status: 201,
                body: Some(Bytes::from_static(br#"{"id":"1","active":true}"#)),
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn uses_configured_header_name() -> anyhow::Result<()> {
        let automation_server = MockServer::start();
        let workflows_mock = automation_server.mock(|when, then| {
            when.method(httpmock::Method::DELETE)
                .path("/api/v1/workflows/1")
                .header("x-api-key", "n8n-api-key")
                .header_missing("x-n8n-api-key");
            then.status(204);
        });

        let forwarder = Forwarder::new(
            &AutomationConfig {
                api_key_header: "X-API-KEY".to_string(),
                ..Default::default()
            },
            create_http_client(&HttpClientConfig::default())?,
        )?;
        let outcome = forwarder
            .forward(
                &mock_credentials(&automation_server.base_url())?,
                &UpstreamRequest::new("DELETE", "api/v1/workflows/1", "", b"")?,
            )
            .await;

        workflows_mock.assert();
        assert_eq!(
            outcome,
            UpstreamOutcome::Response {
                status: 204,
                body: None
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn relays_upstream_errors_verbatim() -> anyhow::Result<()> {
        let automation_server = MockServer::start();
        let workflows_mock = automation_server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/api/v1/workflows/404");
            then.status(404)
                .header("Content-Type", "application/json")
                .json_body(json!({ "message": "Not Found" }));
        });

        let outcome = mock_forwarder()?
            .forward(
                &mock_credentials(&automation_server.base_url())?,
                &UpstreamRequest::new("GET", "api/v1/workflows/404", "", b"")?,
            )
            .await;

        workflows_mock.assert();
        assert_eq!(
            outcome,
            UpstreamOutcome::Response {
                status: 404,
                body: Some(Bytes::from_static(br#"{"message":"Not Found"}"#)),
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn reports_non_json_responses_as_unreachable() -> anyhow::Result<()> {
        let automation_server = MockServer::start();
        let workflows_mock = automation_server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/api/v1/workflows");
            then.status(200)
                .header("Content-Type", "text/html")
                .body("<html>login</html>");
        });

        let outcome = mock_forwarder()?
            .forward(
                &mock_credentials(&automation_server.base_url())?,
                &UpstreamRequest::new("GET", "api/v1/workflows", "", b"")?,
            )
            .await;

        workflows_mock.assert();
        assert_eq!(outcome, UpstreamOutcome::Unreachable);

        Ok(())
    }

    #[tokio::test]
    async fn reports_network_failures_as_unreachable() -> anyhow::Result<()> {
        let outcome = mock_forwarder()?
            .forward(
                &mock_credentials("http://127.0.0.1:1")?,
                &UpstreamRequest::new("GET", "api/v1/workflows", "", b"")?,
            )
            .await;
        assert_eq!(outcome, UpstreamOutcome::Unreachable);

        Ok(())
    }
}
