//! Collaborator contracts
//!
//! The workflow never talks to ClickHouse or parses files itself. It reaches
//! two external services through these traits:
//! - [`DatabaseService`]: connect, list tables/columns, export and import rows
//! - [`FileService`]: upload a file, read its header, sample its rows
//!
//! [`api::ApiClient`] implements both over HTTP. Tests supply in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{Column, ConnectionProfile, FileHandle, Row};

pub mod envelope;
pub mod error;

#[cfg(feature = "api-backend")]
pub mod api;

pub use envelope::ApiResponse;
pub use error::{ServiceError, ServiceResult};

/// Body of an export request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub config: ConnectionProfile,
    pub table: String,
    pub columns: Vec<String>,
    /// Explicit query overriding `SELECT columns FROM table`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl ExportRequest {
    pub fn new(config: ConnectionProfile, table: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            config,
            table: table.into(),
            columns,
            query: None,
        }
    }

    /// Bound the export to the first `limit` rows
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.query = Some(format!(
            "SELECT {} FROM {} LIMIT {}",
            self.columns.join(", "),
            self.table,
            limit
        ));
        self
    }
}

/// Body of an import request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRequest {
    pub config: ConnectionProfile,
    pub table: String,
    pub columns: Vec<Column>,
    /// Server-side path returned by the upload step
    #[serde(rename = "filePath")]
    pub file_path: String,
    pub delimiter: char,
}

/// Database side of the transfer
#[async_trait]
pub trait DatabaseService: Send + Sync {
    /// Verify the connection parameters
    async fn connect(&self, config: &ConnectionProfile) -> ServiceResult<()>;

    /// List tables of the configured database
    async fn list_tables(&self, config: &ConnectionProfile) -> ServiceResult<Vec<String>>;

    /// Column metadata of one table
    async fn list_columns(
        &self,
        config: &ConnectionProfile,
        table: &str,
    ) -> ServiceResult<Vec<Column>>;

    /// Read rows of the requested columns
    async fn export(&self, request: &ExportRequest) -> ServiceResult<Vec<Row>>;

    /// Load an uploaded file into a table, returning the records processed
    async fn import(&self, request: &ImportRequest) -> ServiceResult<usize>;
}

/// Flat-file side of the transfer
#[async_trait]
pub trait FileService: Send + Sync {
    /// Upload a file, returning its server-side path
    async fn upload(&self, file: &FileHandle) -> ServiceResult<String>;

    /// Header row of an uploaded file
    async fn header_columns(&self, file_path: &str, delimiter: char) -> ServiceResult<Vec<String>>;

    /// First `limit` data rows of an uploaded file
    async fn preview(
        &self,
        file_path: &str,
        delimiter: char,
        limit: usize,
    ) -> ServiceResult<Vec<Row>>;

    /// Remove an uploaded file from the server
    async fn cleanup(&self, file_path: &str) -> ServiceResult<()>;
}
