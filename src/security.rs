mod authentication_gateway;
mod identity_user;
mod identity_verification;

pub use self::{
    authentication_gateway::AuthenticationGateway, identity_verification::IdentityVerification,
};
