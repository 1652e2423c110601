mod credentials_resolver;
mod forwarder;
mod multi_tenancy;
mod upstream_outcome;
mod upstream_request;

pub use self::{
    credentials_resolver::CredentialsResolver, forwarder::Forwarder, multi_tenancy::MultiTenancy,
    upstream_outcome::UpstreamOutcome, upstream_request::UpstreamRequest,
};
