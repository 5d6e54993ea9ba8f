//! Common test utilities and in-memory services

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use flatfile_bridge::models::Row;
use flatfile_bridge::service::{ExportRequest, ImportRequest};
use flatfile_bridge::sink::{ExportSink, SinkResult};
use flatfile_bridge::{
    Column, ConnectionProfile, DatabaseService, FileHandle, FileService, OperationStatus,
    ServiceError, ServiceResult,
};

/// A request seen by one of the fakes
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Connect,
    ListTables,
    ListColumns(String),
    Export(ExportRequest),
    Import(ImportRequest),
    Upload(String),
    HeaderColumns { path: String, delimiter: char },
    Preview { path: String, delimiter: char, limit: usize },
    Cleanup(String),
}

/// Busy flags observed by a fake while it was serving a call
#[derive(Default)]
struct Probe {
    status: Mutex<Option<watch::Receiver<OperationStatus>>>,
    seen: Mutex<Vec<bool>>,
}

impl Probe {
    fn sample(&self) {
        if let Some(rx) = self.status.lock().unwrap().as_ref() {
            self.seen.lock().unwrap().push(rx.borrow().busy);
        }
    }
}

fn rejected(message: &Option<String>) -> Option<ServiceError> {
    message.as_ref().map(|m| ServiceError::rejected(m.clone()))
}

/// In-memory database service
#[derive(Default)]
pub struct FakeDatabase {
    pub tables: Vec<String>,
    pub columns: HashMap<String, Vec<Column>>,
    pub rows: Vec<Row>,
    /// Count reported by import
    pub imported: usize,
    pub connect_error: Option<String>,
    pub columns_error: Option<String>,
    pub export_error: Option<String>,
    pub import_error: Option<String>,
    log: Mutex<Vec<Call>>,
    probe: Probe,
}

impl FakeDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: &str, columns: Vec<Column>) -> Self {
        self.tables.push(table.to_string());
        self.columns.insert(table.to_string(), columns);
        self
    }

    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_imported(mut self, count: usize) -> Self {
        self.imported = count;
        self
    }

    pub fn failing_connect(mut self, message: &str) -> Self {
        self.connect_error = Some(message.to_string());
        self
    }

    pub fn failing_import(mut self, message: &str) -> Self {
        self.import_error = Some(message.to_string());
        self
    }

    /// Record the workflow's busy flag on every call
    pub fn observe(&self, status: watch::Receiver<OperationStatus>) {
        *self.probe.status.lock().unwrap() = Some(status);
    }

    pub fn busy_seen(&self) -> Vec<bool> {
        self.probe.seen.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    pub fn exports(&self) -> Vec<ExportRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Export(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn imports(&self) -> Vec<ImportRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Import(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.probe.sample();
        self.log.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DatabaseService for FakeDatabase {
    async fn connect(&self, _config: &ConnectionProfile) -> ServiceResult<()> {
        self.record(Call::Connect);
        match rejected(&self.connect_error) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn list_tables(&self, _config: &ConnectionProfile) -> ServiceResult<Vec<String>> {
        self.record(Call::ListTables);
        Ok(self.tables.clone())
    }

    async fn list_columns(
        &self,
        _config: &ConnectionProfile,
        table: &str,
    ) -> ServiceResult<Vec<Column>> {
        self.record(Call::ListColumns(table.to_string()));
        if let Some(err) = rejected(&self.columns_error) {
            return Err(err);
        }
        self.columns
            .get(table)
            .cloned()
            .ok_or_else(|| ServiceError::rejected(format!("Table {} does not exist", table)))
    }

    async fn export(&self, request: &ExportRequest) -> ServiceResult<Vec<Row>> {
        self.record(Call::Export(request.clone()));
        match rejected(&self.export_error) {
            Some(err) => Err(err),
            None => Ok(self.rows.clone()),
        }
    }

    async fn import(&self, request: &ImportRequest) -> ServiceResult<usize> {
        self.record(Call::Import(request.clone()));
        match rejected(&self.import_error) {
            Some(err) => Err(err),
            None => Ok(self.imported),
        }
    }
}

/// In-memory file service; uploads land under `/uploads/`
#[derive(Default)]
pub struct FakeFiles {
    pub headers: Vec<String>,
    /// Rows in header order
    pub rows: Vec<Row>,
    pub upload_error: Option<String>,
    pub header_error: Option<String>,
    pub cleanup_error: Option<String>,
    log: Mutex<Vec<Call>>,
    probe: Probe,
}

impl FakeFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_headers(mut self, headers: &[&str]) -> Self {
        self.headers = headers.iter().map(|h| h.to_string()).collect();
        self
    }

    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    pub fn failing_upload(mut self, message: &str) -> Self {
        self.upload_error = Some(message.to_string());
        self
    }

    pub fn failing_header(mut self, message: &str) -> Self {
        self.header_error = Some(message.to_string());
        self
    }

    pub fn failing_cleanup(mut self, message: &str) -> Self {
        self.cleanup_error = Some(message.to_string());
        self
    }

    pub fn observe(&self, status: watch::Receiver<OperationStatus>) {
        *self.probe.status.lock().unwrap() = Some(status);
    }

    pub fn busy_seen(&self) -> Vec<bool> {
        self.probe.seen.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    pub fn upload_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Upload(_)))
            .count()
    }

    /// Server-side paths the workflow asked to remove
    pub fn cleanups(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Cleanup(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.probe.sample();
        self.log.lock().unwrap().push(call);
    }
}

#[async_trait]
impl FileService for FakeFiles {
    async fn upload(&self, file: &FileHandle) -> ServiceResult<String> {
        self.record(Call::Upload(file.name.clone()));
        match rejected(&self.upload_error) {
            Some(err) => Err(err),
            None => Ok(format!("/uploads/{}", file.name)),
        }
    }

    async fn header_columns(&self, file_path: &str, delimiter: char) -> ServiceResult<Vec<String>> {
        self.record(Call::HeaderColumns {
            path: file_path.to_string(),
            delimiter,
        });
        match rejected(&self.header_error) {
            Some(err) => Err(err),
            None => Ok(self.headers.clone()),
        }
    }

    async fn preview(
        &self,
        file_path: &str,
        delimiter: char,
        limit: usize,
    ) -> ServiceResult<Vec<Row>> {
        self.record(Call::Preview {
            path: file_path.to_string(),
            delimiter,
            limit,
        });
        Ok(self.rows.iter().take(limit).cloned().collect())
    }

    async fn cleanup(&self, file_path: &str) -> ServiceResult<()> {
        self.record(Call::Cleanup(file_path.to_string()));
        match rejected(&self.cleanup_error) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// A write captured by [`MemorySink`]
#[derive(Debug, Clone, PartialEq)]
pub struct SinkWrite {
    pub path: String,
    pub delimiter: char,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// Export sink keeping writes in memory; clones share the same log
#[derive(Clone, Default)]
pub struct MemorySink {
    writes: Arc<Mutex<Vec<SinkWrite>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<SinkWrite> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExportSink for MemorySink {
    async fn write(
        &self,
        path: &str,
        delimiter: char,
        columns: &[String],
        rows: &[Row],
    ) -> SinkResult<usize> {
        self.writes.lock().unwrap().push(SinkWrite {
            path: path.to_string(),
            delimiter,
            columns: columns.to_vec(),
            rows: rows.to_vec(),
        });
        Ok(rows.len())
    }
}

pub fn events_columns() -> Vec<Column> {
    vec![
        Column::new("id", "UInt64", false),
        Column::new("name", "String", false),
        Column::new("ts", "DateTime", false),
    ]
}
