mod connection_credentials;
mod connection_credentials_store;
mod credentials_error;
mod database_ext;
mod encryption;
mod resolved_credentials;
mod vault;

pub use self::{
    connection_credentials::ConnectionCredentials,
    connection_credentials_store::{ConnectionCredentialsStore, StoredConnectionCredentials},
    credentials_error::CredentialsError,
    encryption::CredentialsEncryption,
    resolved_credentials::{ApiKey, CredentialsSource, ResolvedCredentials},
    vault::Vault,
};
