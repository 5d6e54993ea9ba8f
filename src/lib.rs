//! Flatfile Bridge - guided transfers between ClickHouse and flat files
//!
//! Provides:
//! - The ingestion workflow state machine ([`workflow::Workflow`])
//! - Contracts for the database and file services ([`service`])
//! - An HTTP client for those services (feature `api-backend`)
//! - A CSV writer for database exports ([`sink`])
//! - TOML/env configuration ([`config`])

pub mod config;
#[cfg(feature = "tracing-subscriber")]
pub mod logging;
pub mod models;
pub mod service;
pub mod sink;
pub mod workflow;

pub use config::{BridgeConfig, ConfigError};
pub use models::{
    Column, ConnectionProfile, DataKind, FileHandle, FileProfile, OperationStatus, PreviewResult,
    Severity, SourceKind, StatusMessage, TargetKind,
};
#[cfg(feature = "api-backend")]
pub use service::api::ApiClient;
pub use service::{DatabaseService, FileService, ServiceError, ServiceResult};
pub use sink::{CsvFileSink, ExportSink, SinkError};
pub use workflow::{SessionState, Workflow, WorkflowError};
