use crate::{
    error::Error as FlowgateError, security::IdentityVerification, server::AppState,
    users::UserId,
};
use actix_web::{Error, FromRequest, HttpRequest, dev::Payload, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use std::{future::Future, pin::Pin};
use tracing::debug;

/// User verified with the identity service, required for the credentials management.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let state = web::Data::<AppState>::extract(&req).await?;
            let multi_tenancy = state.multi_tenancy()?;

            let Some(bearer_auth) = Option::<BearerAuth>::extract(&req).await? else {
                debug!("Bearer token is missing.");
                return Err(FlowgateError::unauthorized("Authentication required.").into());
            };

            match multi_tenancy.gateway.verify(bearer_auth.token()).await {
                IdentityVerification::Verified(id) => Ok(AuthenticatedUser { id }),
                IdentityVerification::Rejected => {
                    Err(FlowgateError::unauthorized("Authentication required.").into())
                }
            }
        })
    }
}
