use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error type for calls to the backend REST API
#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The backend could not be reached (DNS, refused, timeout)
    Connection(String),
    /// The backend answered with a non-success status
    Api {
        /// HTTP status returned by the backend
        status: u16,
        /// `error` field of the response body, or a generic message
        message: String,
    },
    /// The backend answered 2xx but the body did not match the expected shape
    Decode(String),
    /// The outgoing request could not be assembled
    InvalidRequest(String),
}

impl BackendError {
    /// Build an API error from a status and the raw response text
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("API Error: {}", status));

        BackendError::Api { status, message }
    }

    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Connection(msg) => write!(f, "Failed to connect to backend: {}", msg),
            BackendError::Api { message, .. } => write!(f, "{}", message),
            BackendError::Decode(msg) => write!(f, "Unexpected backend response: {}", msg),
            BackendError::InvalidRequest(msg) => write!(f, "Invalid backend request: {}", msg),
        }
    }
}

impl Error for BackendError {}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else if err.is_builder() {
            BackendError::InvalidRequest(err.to_string())
        } else {
            BackendError::Connection(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}
