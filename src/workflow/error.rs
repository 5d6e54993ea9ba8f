//! Error types for workflow operations
//!
//! Every failure is caught by the task runner and turned into the session's
//! single status message; nothing here escapes a workflow operation.

use thiserror::Error;

use crate::models::Severity;
use crate::service::ServiceError;
use crate::sink::SinkError;

/// Fallback text for a failed upload without a server message
pub const UPLOAD_FALLBACK: &str = "Failed to upload file";

/// Warning when a database step runs without a table
pub const SELECT_TABLE_FIRST: &str = "Please select a table first.";

/// Warning when a file step runs without a file
pub const SELECT_FILE_FIRST: &str = "Please select a file first.";

/// Errors that can end a workflow operation
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// A required selection or input is missing; nothing was attempted
    #[error("{0}")]
    Precondition(String),

    /// A collaborator call failed
    #[error("{operation} failed: {source}")]
    Service {
        operation: &'static str,
        #[source]
        source: ServiceError,
    },

    /// Uploading the selected file failed
    #[error("Upload failed: {0}")]
    Upload(#[source] ServiceError),

    /// Writing exported rows failed
    #[error("Failed to write export: {0}")]
    Sink(#[from] SinkError),
}

/// Result type for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;

impl WorkflowError {
    /// Create a precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// Wrap a collaborator failure with the name of the failing call
    pub fn service(operation: &'static str, source: ServiceError) -> Self {
        Self::Service { operation, source }
    }

    /// Severity the failure is reported with
    pub fn severity(&self) -> Severity {
        match self {
            WorkflowError::Precondition(_) => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Text shown to the user.
    ///
    /// Service text wins over `fallback`; local failures describe themselves.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            WorkflowError::Precondition(text) => text.clone(),
            WorkflowError::Service { source, .. } => {
                source.server_message().unwrap_or(fallback).to_string()
            }
            WorkflowError::Upload(source) => {
                source.server_message().unwrap_or(UPLOAD_FALLBACK).to_string()
            }
            WorkflowError::Sink(err) => err.to_string(),
        }
    }
}
