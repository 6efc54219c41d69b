//! Errors surfaced by [`crate::ApiClient`].

use reqwest::header::InvalidHeaderValue;
use thiserror::Error;

use crate::security::StorageError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Login rejected by the backend. Carries the message to show on the form.
    #[error("{0}")]
    Auth(String),

    /// Non-2xx response after the refresh path, or a transport failure
    /// (`status` is `None` for DNS, connect and timeout errors).
    #[error(
        "request failed{}: {message}",
        .status.map(|s| format!(" with status {s}")).unwrap_or_default()
    )]
    Request {
        status: Option<u16>,
        message: String,
    },

    /// 2xx response whose body did not match the expected shape.
    #[error("failed to decode response body (status {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// HTTP status of the final response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Request { status, .. } => *status,
            ClientError::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Request { status: None, .. })
    }
}
