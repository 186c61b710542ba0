//! Error types for the request pipeline.
//!
//! # Design
//! One enum covers every terminal failure of a pipeline call. Validation
//! failures keep the rejected response so callers can branch on it (a 404 is
//! not a 500). Transport failures are boxed and passed through untouched.

use crate::http::{RawResponse, StatusCode};
use crate::validation::Rejection;

/// Boxed error used for causes the crate does not interpret.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by URL rendering and pipeline execution.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The URL components cannot form a syntactically valid URL.
    #[error("invalid URL: {reason}")]
    InvalidUrl { reason: String },

    /// The request body could not be serialized.
    #[error("encoding failed: {source}")]
    Encoding {
        #[source]
        source: BoxError,
    },

    /// The response body could not be parsed into the expected type.
    #[error("decoding failed: {source}")]
    Decoding {
        #[source]
        source: BoxError,
        body: Option<Vec<u8>>,
    },

    /// A validator in the chain rejected the response.
    #[error("response rejected by {} validator: {rejection}", .rejection.kind())]
    Validation {
        rejection: Rejection,
        response: Box<RawResponse>,
    },

    /// An operation that needs a request body was invoked without one.
    #[error("missing required request data")]
    MissingRequiredData,

    #[error("transport error: {0}")]
    Transport(#[source] BoxError),
}

impl Error {
    pub fn invalid_url(reason: impl Into<String>) -> Self {
        Error::InvalidUrl {
            reason: reason.into(),
        }
    }

    /// The rejected response, for validation failures.
    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            Error::Validation { response, .. } => Some(response),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.response().map(|r| r.status)
    }
}
