use crate::error::Error as FlowgateError;
use anyhow::anyhow;
use reqwest::Method;
use serde_json::Value as JsonValue;

/// Request to replay against the automation server. Carries no inbound headers, so neither
/// cookies nor the inbound `Authorization` header can reach the upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    /// HTTP method of the inbound request.
    pub method: Method,
    /// Path segments relative to the automation server base URL.
    pub segments: Vec<String>,
    /// Raw inbound query string, if any.
    pub query: Option<String>,
    /// JSON body for the methods that carry one.
    pub body: Option<JsonValue>,
}

impl UpstreamRequest {
    /// Builds upstream request from the parts of the inbound request.
    pub fn new(method: &str, path: &str, query: &str, body: &[u8]) -> Result<Self, FlowgateError> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| FlowgateError::client(format!("Unsupported HTTP method: {method}.")))?;

        let segments = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                // Router keeps `%`, `/` and `+` escaped, upstream URL builder re-encodes them.
                let segment = urlencoding::decode(segment).map_err(|_| {
                    FlowgateError::client("Proxy path must be valid UTF-8.")
                })?;
                if segment == "." || segment == ".." {
                    Err(FlowgateError::client(
                        "Proxy path cannot contain relative segments.",
                    ))
                } else {
                    Ok(segment.into_owned())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let body = if method == Method::GET || method == Method::HEAD {
            None
        } else if body.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            Some(serde_json::from_slice::<JsonValue>(body).map_err(|err| {
                FlowgateError::client_with_root_cause(
                    anyhow!(err).context("Request body must be valid JSON."),
                )
            })?)
        };

        Ok(Self {
            method,
            segments,
            query: if query.is_empty() {
                None
            } else {
                Some(query.to_string())
            },
            body,
        })
    }
}
