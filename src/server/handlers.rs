mod credentials_get;
mod credentials_remove;
mod credentials_set;
mod proxy_forward;
mod status_get;

pub use self::{
    credentials_get::credentials_get, credentials_remove::credentials_remove,
    credentials_set::credentials_set, proxy_forward::proxy_forward, status_get::status_get,
};
