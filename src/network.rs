use crate::config::HttpClientConfig;
use anyhow::Context;
use reqwest::redirect::Policy;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

/// Creates HTTP client shared by the identity service and automation server calls. The client
/// never follows redirects, so the injected secret header can't be replayed to another host, and
/// never retries, so non-idempotent calls aren't replayed either.
pub fn create_http_client(config: &HttpClientConfig) -> anyhow::Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .pool_idle_timeout(config.pool_idle_timeout)
        .connection_verbose(config.verbose)
        .redirect(Policy::none())
        .build()
        .with_context(|| "Cannot build HTTP client.")?;

    Ok(ClientBuilder::new(client)
        .with(TracingMiddleware::default())
        .build())
}
