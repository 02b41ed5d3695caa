//! Story API error types
//!
//! Every failure is one of three things from the caller's point of view:
//! the server answered with an error, no answer arrived, or the request was
//! never sent. [`ApiError::failure`] exposes that classification.

use serde::Deserialize;
use thiserror::Error;

use crate::models::ModelError;

/// Errors that can occur when talking to the story service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Server responded with a non-success status
    #[error("API error {status}: {title}: {message}")]
    Response {
        status: u16,
        title: String,
        message: String,
    },

    /// Connection failed or timed out before a response arrived
    #[error("Did not receive a response from the server: {0}")]
    NoResponse(#[source] reqwest::Error),

    /// Request could not be built or its input was rejected locally
    #[error("Error occurred while setting up request: {0}")]
    RequestSetup(String),

    /// Successful response whose body does not match the expected schema
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

/// Coarse classification shown to users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    ServerResponded,
    NoResponse,
    RequestSetup,
}

impl ApiError {
    pub fn failure(&self) -> Failure {
        match self {
            ApiError::Response { .. } | ApiError::InvalidResponse(_) => Failure::ServerResponded,
            ApiError::NoResponse(_) => Failure::NoResponse,
            ApiError::RequestSetup(_) => Failure::RequestSetup,
        }
    }

    /// HTTP status, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Build an error from a non-success status and its raw body
    pub(crate) fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => ApiError::Response {
                status: envelope.error.status.unwrap_or(status.as_u16()),
                title: envelope
                    .error
                    .title
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("Error").to_string()),
                message: envelope.error.message.unwrap_or_default(),
            },
            Err(_) => ApiError::Response {
                status: status.as_u16(),
                title: status.canonical_reason().unwrap_or("Error").to_string(),
                message: body.trim().to_string(),
            },
        }
    }

    /// Classify a transport-level failure
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ApiError::RequestSetup(err.to_string())
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::NoResponse(err)
        }
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        ApiError::RequestSetup(err.to_string())
    }
}

/// Result type alias for story API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Error body returned by the story service
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    status: Option<u16>,
    title: Option<String>,
    message: Option<String>,
}
