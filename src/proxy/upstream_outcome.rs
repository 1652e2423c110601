use crate::error::Error as FlowgateError;
use actix_web::{HttpResponse, http::StatusCode};
use anyhow::anyhow;
use bytes::Bytes;

/// Outcome of the call to the automation server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamOutcome {
    /// Automation server replied with a JSON body or with no body at all.
    Response { status: u16, body: Option<Bytes> },
    /// Automation server couldn't be reached, timed out, or replied with a non-JSON body.
    Unreachable,
}

impl UpstreamOutcome {
    /// Converts the outcome to the response relayed to the client.
    pub fn into_http_response(self) -> Result<HttpResponse, FlowgateError> {
        match self {
            Self::Response { status, body } => {
                let status = StatusCode::from_u16(status).map_err(|err| {
                    FlowgateError::upstream(anyhow!(err).context("Invalid upstream status code."))
                })?;
                let mut response = HttpResponse::build(status);
                Ok(match body {
                    Some(body) => response.content_type("application/json").body(body),
                    None => response.finish(),
                })
            }
            Self::Unreachable => Err(FlowgateError::upstream(anyhow!(
                "Automation server is unreachable or returned an invalid response."
            ))),
        }
    }
}
