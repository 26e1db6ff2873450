//! Error types for the Dead Man's Snitch API client.

use thiserror::Error;

/// Base error type for snitch operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Precondition(#[from] PreconditionError),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to encode request body: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Caller-supplied data that was missing or malformed. Raised before any request is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required options: {}", .0.join(", "))]
    MissingOptions(Vec<&'static str>),

    #[error("Invalid snitch interval: {0}")]
    InvalidInterval(String),

    #[error("Invalid data")]
    InvalidData,

    #[error("Missing snitch")]
    MissingSnitch,

    #[error("Invalid tags")]
    InvalidTags,
}

/// The operation needs a remote resource but was handed an unsaved one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("Cannot {action} a snitch without a token")]
    MissingToken { action: &'static str },
}

/// Raised when the API rejects the key (HTTP 401).
#[derive(Error, Debug)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
}

/// Raised when the API returns a non-success status.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status_code: Option<u16>,
    pub response_data: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(
        message: impl Into<String>,
        status_code: Option<u16>,
        response_data: Option<serde_json::Value>,
    ) -> Self {
        Self {
            message: message.into(),
            status_code,
            response_data,
        }
    }
}

impl Error {
    /// Returns `true` if the error was raised locally, before any network activity.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Precondition(_)
                | Self::InvalidUrl(_)
                | Self::Serialization(_)
        )
    }

    /// Returns `true` if the API answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Api(ApiError {
                status_code: Some(404),
                ..
            })
        )
    }
}
