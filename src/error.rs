mod error_kind;

use crate::credentials::CredentialsError;
use actix_web::{HttpResponse, HttpResponseBuilder, ResponseError, http::StatusCode};
use anyhow::anyhow;
use serde_json::json;
use std::fmt::{Debug, Display, Formatter};

pub use error_kind::ErrorKind;

/// Message returned to the client when the automation server cannot be reached.
const UPSTREAM_FAILURE_MESSAGE: &str =
    "The automation server could not be reached or returned an invalid response.";

/// Message returned to the client for all unexpected errors.
const UNKNOWN_ERROR_MESSAGE: &str = "The operation could not be completed due to a system error. Please try again later or contact us for assistance.";

/// Flowgate native error type.
#[derive(thiserror::Error)]
pub struct Error {
    root_cause: anyhow::Error,
    kind: ErrorKind,
}

impl Error {
    /// Creates a Client error instance with the given root cause.
    pub fn client_with_root_cause(root_cause: anyhow::Error) -> Self {
        Self {
            root_cause,
            kind: ErrorKind::ClientError,
        }
    }

    /// Creates a Client error instance with the given message.
    pub fn client<M>(message: M) -> Self
    where
        M: Display + Debug + Send + Sync + 'static,
    {
        Self {
            root_cause: anyhow!(message),
            kind: ErrorKind::ClientError,
        }
    }

    /// Creates an Unauthorized error instance with the given message. The message is returned to
    /// the client as is and must not reveal which authentication check failed.
    pub fn unauthorized<M>(message: M) -> Self
    where
        M: Display + Debug + Send + Sync + 'static,
    {
        Self {
            root_cause: anyhow!(message),
            kind: ErrorKind::Unauthorized,
        }
    }

    /// Creates a Not Configured error instance with the given message.
    pub fn not_configured<M>(message: M) -> Self
    where
        M: Display + Debug + Send + Sync + 'static,
    {
        Self {
            root_cause: anyhow!(message),
            kind: ErrorKind::NotConfigured,
        }
    }

    /// Creates an Upstream Failure error instance with the given root cause. The root cause is
    /// never returned to the client.
    pub fn upstream(root_cause: anyhow::Error) -> Self {
        Self {
            root_cause,
            kind: ErrorKind::UpstreamFailure,
        }
    }

    /// Returns the kind of the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.root_cause, f)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.root_cause, f)
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.kind {
            ErrorKind::ClientError => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::UpstreamFailure => StatusCode::BAD_GATEWAY,
            ErrorKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        HttpResponseBuilder::new(status_code).json(json!({
            "error": status_code.canonical_reason().unwrap_or("Error"),
            "message": match self.kind {
                ErrorKind::ClientError | ErrorKind::Unauthorized | ErrorKind::NotConfigured => {
                    self.root_cause.to_string()
                }
                ErrorKind::UpstreamFailure => UPSTREAM_FAILURE_MESSAGE.to_string(),
                ErrorKind::Unknown => UNKNOWN_ERROR_MESSAGE.to_string(),
            }
        }))
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        err.downcast::<Error>().unwrap_or_else(|root_cause| Error {
            root_cause,
            kind: ErrorKind::Unknown,
        })
    }
}

impl From<CredentialsError> for Error {
    fn from(err: CredentialsError) -> Error {
        match err {
            CredentialsError::Configuration => {
                Error::not_configured("Multi-tenant mode is not configured.")
            }
            CredentialsError::Validation(message) => Error::client(message),
            CredentialsError::Integrity => {
                Error::from(anyhow!("Stored credentials cannot be decrypted."))
            }
            CredentialsError::Internal(root_cause) => Error::from(root_cause),
        }
    }
}
