//! Schema discovery: tables for a database source, header columns for a file

use tracing::info;

use super::error::{SELECT_FILE_FIRST, SELECT_TABLE_FIRST, WorkflowError, WorkflowResult};
use super::session::SessionState;
use crate::models::{Column, StatusMessage};
use crate::service::{DatabaseService, FileService, ServiceError};

pub const CONNECT_LABEL: &str = "Connecting to ClickHouse";
pub const CONNECT_FALLBACK: &str = "Connection failed";
pub const TABLE_COLUMNS_LABEL: &str = "Loading columns";
pub const TABLE_COLUMNS_FALLBACK: &str = "Failed to load columns";
pub const FILE_COLUMNS_LABEL: &str = "Reading file columns";
pub const FILE_COLUMNS_FALLBACK: &str = "Failed to read file header";

/// Connect and list the database's tables
pub(crate) async fn connect<D>(
    session: &mut SessionState,
    database: &D,
) -> WorkflowResult<Option<StatusMessage>>
where
    D: DatabaseService + ?Sized,
{
    session.clear_tables();

    database
        .connect(&session.connection)
        .await
        .map_err(|e| WorkflowError::service("connect", e))?;
    let tables = database
        .list_tables(&session.connection)
        .await
        .map_err(|e| WorkflowError::service("list tables", e))?;

    let count = tables.len();
    info!(address = %session.connection.address(), tables = count, "Connected");
    session.set_tables(tables);

    Ok(Some(StatusMessage::success(format!(
        "Connected! Found {} tables.",
        count
    ))))
}

/// Load the selected table's columns and select all of them
pub(crate) async fn load_from_table<D>(
    session: &mut SessionState,
    database: &D,
) -> WorkflowResult<Option<StatusMessage>>
where
    D: DatabaseService + ?Sized,
{
    session.clear_schema();
    let table = session.selected_table().to_string();
    if table.is_empty() {
        return Err(WorkflowError::precondition(SELECT_TABLE_FIRST));
    }

    let columns = database
        .list_columns(&session.connection, &table)
        .await
        .map_err(|e| WorkflowError::service("list columns", e))?;

    let count = columns.len();
    info!(table = %table, columns = count, "Loaded table columns");
    session.set_columns(columns);

    Ok(Some(StatusMessage::success(format!(
        "Loaded {} columns from {}",
        count, table
    ))))
}

/// Upload the selected file, read its header and select every column.
///
/// Any failure also forgets the selected file.
pub(crate) async fn load_from_file<F>(
    session: &mut SessionState,
    files: &F,
) -> WorkflowResult<Option<StatusMessage>>
where
    F: FileService + ?Sized,
{
    session.clear_schema();
    let name = match session.selected_file() {
        Some(file) => file.name.clone(),
        None => return Err(WorkflowError::precondition(SELECT_FILE_FIRST)),
    };

    let columns = match read_header(session, files).await {
        Ok(columns) => columns,
        Err(err) => {
            session.forget_file();
            return Err(err);
        }
    };

    let count = columns.len();
    info!(file = %name, columns = count, "Read file header");
    session.set_columns(columns);

    Ok(Some(StatusMessage::success(format!(
        "Found {} columns in {}",
        count, name
    ))))
}

async fn read_header<F>(session: &mut SessionState, files: &F) -> WorkflowResult<Vec<Column>>
where
    F: FileService + ?Sized,
{
    let path = ensure_uploaded(session, files, |e| WorkflowError::service("upload", e)).await?;
    let headers = files
        .header_columns(&path, session.file.delimiter)
        .await
        .map_err(|e| WorkflowError::service("file columns", e))?;

    Ok(headers.into_iter().map(Column::from_header).collect())
}

/// Server-side path of the selected file, uploading it on first use
pub(crate) async fn ensure_uploaded<F>(
    session: &mut SessionState,
    files: &F,
    on_error: fn(ServiceError) -> WorkflowError,
) -> WorkflowResult<String>
where
    F: FileService + ?Sized,
{
    if let Some(path) = session.uploaded_path() {
        return Ok(path.to_string());
    }

    let file = session
        .selected_file()
        .ok_or_else(|| WorkflowError::precondition(SELECT_FILE_FIRST))?;
    let path = files.upload(file).await.map_err(on_error)?;

    info!(file = %file.name, bytes = file.len(), path = %path, "Uploaded file");
    session.set_uploaded_path(path.clone());
    Ok(path)
}
