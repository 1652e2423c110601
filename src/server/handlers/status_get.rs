use crate::server::AppState;
use actix_web::{HttpResponse, web};
use serde_derive::Serialize;

/// Describes which credential resolution modes are enabled, never the configured values.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct Status<'a> {
    pub version: &'a str,
    pub multi_tenant: bool,
    pub fallback: bool,
}

pub async fn status_get(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(Status {
        version: &state.config.version,
        multi_tenant: state.resolver.multi_tenancy().is_some(),
        fallback: state.resolver.has_fallback(),
    })
}
