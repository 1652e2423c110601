use crate::{error::Error as FlowgateError, server::AppState, server::AuthenticatedUser};
use actix_web::{HttpResponse, web};
use serde_json::json;
use tracing::error;

/// GET /api/credentials
pub async fn credentials_get(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, FlowgateError> {
    let vault = &state.multi_tenancy()?.vault;
    match vault.get(&user.id).await {
        Ok(credentials) => Ok(HttpResponse::Ok().json(json!({ "credentials": credentials }))),
        Err(err) => {
            error!(user.id = %user.id, "Failed to retrieve connection credentials: {err:?}");
            Err(err.into())
        }
    }
}
