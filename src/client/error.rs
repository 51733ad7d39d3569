//! Backend client error types

use thiserror::Error;

/// Errors that can occur when talking to the learning backend
#[derive(Error, Debug)]
pub enum ClientError {
    /// Could not connect to the backend
    #[error("Backend unavailable")]
    Unavailable,

    /// Request exceeded the configured timeout
    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success status; `message` is the server's `message` field when present
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

impl ClientError {
    /// Classify a transport error from reqwest
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Unavailable
        } else {
            ClientError::Request(err)
        }
    }

    /// HTTP status, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text suitable for showing to the learner
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } if !message.is_empty() => message.clone(),
            ClientError::Unavailable => "Could not reach the server".to_string(),
            ClientError::Timeout => "The server took too long to answer".to_string(),
            _ => "Something went wrong".to_string(),
        }
    }
}

/// Result type alias for backend calls
pub type ClientResult<T> = Result<T, ClientError>;
