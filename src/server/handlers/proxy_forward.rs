use crate::{error::Error as FlowgateError, proxy::UpstreamRequest, server::AppState};
use actix_web::{HttpRequest, HttpResponse, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use bytes::Bytes;
use tracing::debug;

/// Message returned when neither user nor fallback credentials are available.
const CREDENTIALS_REQUIRED_MESSAGE: &str =
    "Automation server connection is not configured. Sign in and save your connection credentials.";

/// ANY /api/proxy/{path...}
pub async fn proxy_forward(
    state: web::Data<AppState>,
    request: HttpRequest,
    bearer_auth: Option<BearerAuth>,
    body: Bytes,
) -> Result<HttpResponse, FlowgateError> {
    let Some(credentials) = state
        .resolver
        .resolve(bearer_auth.as_ref().map(|bearer_auth| bearer_auth.token()))
        .await
    else {
        return Err(FlowgateError::unauthorized(CREDENTIALS_REQUIRED_MESSAGE));
    };

    let upstream_request = UpstreamRequest::new(
        request.method().as_str(),
        request.match_info().get("path").unwrap_or_default(),
        request.query_string(),
        &body,
    )?;

    debug!(
        method = %upstream_request.method,
        credentials.source = ?credentials.source,
        "Forwarding request to the automation server."
    );

    state
        .forwarder
        .forward(&credentials, &upstream_request)
        .await
        .into_http_response()
}
