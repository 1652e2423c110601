use crate::{
    credentials::CredentialsError,
    error::Error as FlowgateError,
    server::{AppState, AuthenticatedUser},
};
use actix_web::{HttpResponse, web};
use anyhow::anyhow;
use bytes::Bytes;
use serde_derive::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

#[derive(Deserialize)]
pub struct CredentialsSetParams {
    pub server_url: String,
    pub secret: String,
}

/// POST /api/credentials, PUT /api/credentials
///
/// Body is parsed only once the user is authenticated, so unauthenticated callers never learn
/// anything about the body format.
pub async fn credentials_set(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: Bytes,
) -> Result<HttpResponse, FlowgateError> {
    let vault = &state.multi_tenancy()?.vault;
    let params = serde_json::from_slice::<CredentialsSetParams>(&body).map_err(|err| {
        FlowgateError::client_with_root_cause(anyhow!(err).context("Invalid request body."))
    })?;

    match vault
        .save(&user.id, &params.server_url, &params.secret)
        .await
    {
        Ok(credentials) => {
            info!(user.id = %user.id, credentials.id = %credentials.id, "Saved connection credentials.");
            Ok(HttpResponse::Ok().json(json!({ "success": true })))
        }
        Err(err @ CredentialsError::Validation(_)) => {
            debug!(user.id = %user.id, "Rejected invalid connection credentials: {err}");
            Err(err.into())
        }
        Err(err) => {
            error!(user.id = %user.id, "Failed to save connection credentials: {err:?}");
            Err(err.into())
        }
    }
}
