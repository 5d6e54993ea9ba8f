//! HTTP service client
//!
//! Implements [`DatabaseService`] and [`FileService`] against the ingestion
//! API (`/clickhouse/*` and `/file/*` routes). Every endpoint answers with the
//! envelope described in [`super::envelope`].
//!
//! ## Security
//!
//! Table names are validated and URL-encoded before they are placed in a
//! request path. Credentials only travel in request bodies and are never
//! logged.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::envelope::{ApiResponse, decode_or_default, record_count};
use super::{
    DatabaseService, ExportRequest, FileService, ImportRequest, ServiceError, ServiceResult,
};
use crate::models::{Column, ConnectionProfile, FileHandle, Row};

pub use crate::config::DEFAULT_API_URL;

/// Maximum allowed length for a table name in a request path
const MAX_TABLE_NAME_LENGTH: usize = 256;

/// Validate a table name for use in an API path.
///
/// Rejects empty names, names longer than [`MAX_TABLE_NAME_LENGTH`] and
/// names containing control characters.
fn validate_table_name(table: &str) -> ServiceResult<()> {
    if table.trim().is_empty() {
        return Err(ServiceError::rejected("Table name is required"));
    }

    if table.len() > MAX_TABLE_NAME_LENGTH {
        return Err(ServiceError::rejected(format!(
            "Table name too long (max {} characters)",
            MAX_TABLE_NAME_LENGTH
        )));
    }

    if table.chars().any(char::is_control) {
        return Err(ServiceError::rejected(
            "Table name contains control characters",
        ));
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct UploadData {
    #[serde(rename = "filePath")]
    file_path: String,
}

/// HTTP client for the database and file services
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the API server (e.g., "http://localhost:8080/api")
    ///
    /// # Example
    ///
    /// ```rust
    /// use flatfile_bridge::service::api::ApiClient;
    ///
    /// let client = ApiClient::new("http://localhost:8080/api");
    /// assert_eq!(client.base_url(), "http://localhost:8080/api");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_base_url(base_url.into()),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client whose requests give up after `timeout_secs`
    pub fn with_timeout(base_url: impl Into<String>, timeout_secs: u64) -> ServiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ServiceError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: trim_base_url(base_url.into()),
            client,
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request for an API path
    fn build_request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, &url)
    }

    /// Send a request and unwrap the response envelope
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
    ) -> ServiceResult<Option<Value>> {
        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::Network(format!("{} request failed: {}", operation, e)))?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            ServiceError::Network(format!("Failed to read {} response: {}", operation, e))
        })?;

        debug!(operation, status, bytes = body.len(), "Service responded");

        match serde_json::from_slice::<ApiResponse>(&body) {
            Ok(envelope) => envelope.into_data(Some(status)),
            Err(_) if !(200..300).contains(&status) => Err(ServiceError::Rejected {
                status: Some(status),
                message: None,
            }),
            Err(e) => Err(ServiceError::Serialization(format!(
                "Failed to parse {} response: {}",
                operation, e
            ))),
        }
    }
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[async_trait]
impl DatabaseService for ApiClient {
    async fn connect(&self, config: &ConnectionProfile) -> ServiceResult<()> {
        let request = self
            .build_request(reqwest::Method::POST, "/clickhouse/connect")
            .json(config);
        self.send(request, "connect").await?;
        Ok(())
    }

    async fn list_tables(&self, config: &ConnectionProfile) -> ServiceResult<Vec<String>> {
        let request = self
            .build_request(reqwest::Method::POST, "/clickhouse/tables")
            .json(config);
        decode_or_default(self.send(request, "list tables").await?)
    }

    async fn list_columns(
        &self,
        config: &ConnectionProfile,
        table: &str,
    ) -> ServiceResult<Vec<Column>> {
        validate_table_name(table)?;

        let encoded_table = urlencoding::encode(table);
        let request = self
            .build_request(
                reqwest::Method::POST,
                &format!("/clickhouse/columns/{}", encoded_table),
            )
            .json(config);
        decode_or_default(self.send(request, "list columns").await?)
    }

    async fn export(&self, request: &ExportRequest) -> ServiceResult<Vec<Row>> {
        let http = self
            .build_request(reqwest::Method::POST, "/clickhouse/export")
            .json(request);
        decode_or_default(self.send(http, "export").await?)
    }

    async fn import(&self, request: &ImportRequest) -> ServiceResult<usize> {
        let http = self
            .build_request(reqwest::Method::POST, "/clickhouse/import")
            .json(request);
        let data = self.send(http, "import").await?;
        Ok(record_count(data.as_ref()))
    }
}

#[async_trait]
impl FileService for ApiClient {
    async fn upload(&self, file: &FileHandle) -> ServiceResult<String> {
        let part = reqwest::multipart::Part::bytes(file.content.clone()).file_name(file.name.clone());
        let form = reqwest::multipart::Form::new().part("file", part);

        let request = self
            .build_request(reqwest::Method::POST, "/file/upload")
            .multipart(form);
        let data = self.send(request, "upload").await?.ok_or_else(|| {
            ServiceError::Serialization("Upload response did not include a file path".to_string())
        })?;

        let upload: UploadData = serde_json::from_value(data)?;
        Ok(upload.file_path)
    }

    async fn header_columns(&self, file_path: &str, delimiter: char) -> ServiceResult<Vec<String>> {
        let delimiter = delimiter.to_string();
        let request = self
            .build_request(reqwest::Method::GET, "/file/columns")
            .query(&[("filePath", file_path), ("delimiter", delimiter.as_str())]);
        decode_or_default(self.send(request, "file columns").await?)
    }

    async fn preview(
        &self,
        file_path: &str,
        delimiter: char,
        limit: usize,
    ) -> ServiceResult<Vec<Row>> {
        let delimiter = delimiter.to_string();
        let limit = limit.to_string();
        let request = self
            .build_request(reqwest::Method::GET, "/file/preview")
            .query(&[
                ("filePath", file_path),
                ("delimiter", delimiter.as_str()),
                ("limit", limit.as_str()),
            ]);
        decode_or_default(self.send(request, "file preview").await?)
    }

    async fn cleanup(&self, file_path: &str) -> ServiceResult<()> {
        let request = self
            .build_request(reqwest::Method::POST, "/file/cleanup")
            .query(&[("filePath", file_path)]);
        self.send(request, "file cleanup").await?;
        Ok(())
    }
}
