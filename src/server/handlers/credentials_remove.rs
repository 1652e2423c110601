use crate::{
    error::Error as FlowgateError,
    server::{AppState, AuthenticatedUser},
};
use actix_web::{HttpResponse, web};
use serde_json::json;
use tracing::{error, info};

/// DELETE /api/credentials
pub async fn credentials_remove(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, FlowgateError> {
    let vault = &state.multi_tenancy()?.vault;
    match vault.delete(&user.id).await {
        Ok(()) => {
            info!(user.id = %user.id, "Removed connection credentials.");
            Ok(HttpResponse::Ok().json(json!({ "success": true })))
        }
        Err(err) => {
            error!(user.id = %user.id, "Failed to remove connection credentials: {err:?}");
            Err(err.into())
        }
    }
}
