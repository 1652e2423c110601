use serde_derive::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};
use std::time::Duration;

/// Outbound HTTP settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct HttpConfig {
    /// Client shared by the token verification and the proxied automation server calls.
    pub client: HttpClientConfig,
}

/// Limits of the shared HTTP client. All durations are in milliseconds.
#[serde_as]
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Upper bound for the whole upstream call, from connecting to reading the last body byte.
    /// A proxied request that exceeds it is answered with `502`. Default is 30 seconds.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub timeout: Duration,
    /// Upper bound for establishing a connection. Keeps an unreachable identity service from
    /// stalling every authenticated request for the full `timeout`. Default is 5 seconds.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub connect_timeout: Duration,
    /// How long idle keep-alive connections to the identity service and automation servers are
    /// kept in the pool. Default is 90 seconds.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub pool_idle_timeout: Duration,
    /// Emits connection-level trace logs. Default is false.
    pub verbose: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            pool_idle_timeout: Duration::from_secs(90),
            verbose: false,
        }
    }
}
