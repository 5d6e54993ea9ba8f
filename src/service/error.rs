//! Error type for collaborator calls

use thiserror::Error;

/// Failure of a request to the database or file service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service answered but did not report success
    #[error("{}", .message.as_deref().unwrap_or("Request rejected by service"))]
    Rejected {
        /// HTTP status, when the failure came over HTTP
        status: Option<u16>,
        /// Error text supplied by the service
        message: Option<String>,
    },

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// The response could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Local IO failure while preparing a request
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type for collaborator calls
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Rejection carrying the service's own error text
    pub fn rejected(message: impl Into<String>) -> Self {
        ServiceError::Rejected {
            status: None,
            message: Some(message.into()),
        }
    }

    /// Error text supplied by the service, if there is a non-empty one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ServiceError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Serialization(err.to_string())
    }
}
