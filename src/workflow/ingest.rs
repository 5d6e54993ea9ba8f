//! Export and import runs

use tracing::info;

use super::error::{SELECT_FILE_FIRST, SELECT_TABLE_FIRST, WorkflowError, WorkflowResult};
use super::schema::ensure_uploaded;
use super::session::SessionState;
use crate::models::{DataKind, StatusMessage};
use crate::service::{DatabaseService, ExportRequest, FileService, ImportRequest};
use crate::sink::ExportSink;

pub const INGEST_LABEL: &str = "Starting ingestion";
pub const INGEST_FALLBACK: &str = "Failed to process data";
pub const SELECT_COLUMNS_TO_INGEST: &str = "Please select columns to ingest.";
pub const MISSING_OUTPUT_PATH: &str = "Please provide an output file path.";

/// Move the selected columns from the source to the target.
///
/// Database sources are exported and written locally through `sink`; file
/// sources are uploaded (once per selected file) and imported.
pub(crate) async fn start_ingestion<D, F>(
    session: &mut SessionState,
    database: &D,
    files: &F,
    sink: &dyn ExportSink,
) -> WorkflowResult<Option<StatusMessage>>
where
    D: DatabaseService + ?Sized,
    F: FileService + ?Sized,
{
    if session.selection().is_empty() {
        return Err(WorkflowError::precondition(SELECT_COLUMNS_TO_INGEST));
    }

    let processed = match session.source() {
        DataKind::Database => export_to_file(session, database, sink).await?,
        DataKind::File => import_from_file(session, database, files).await?,
    };

    Ok(Some(StatusMessage::success(format!(
        "Successfully processed {} records",
        processed
    ))))
}

async fn export_to_file<D>(
    session: &SessionState,
    database: &D,
    sink: &dyn ExportSink,
) -> WorkflowResult<usize>
where
    D: DatabaseService + ?Sized,
{
    let table = session.selected_table();
    if table.is_empty() {
        return Err(WorkflowError::precondition(SELECT_TABLE_FIRST));
    }
    let output_path = session.file.output_path.trim();
    if output_path.is_empty() {
        return Err(WorkflowError::precondition(MISSING_OUTPUT_PATH));
    }

    let columns = session.selected_column_names();
    let request = ExportRequest::new(session.connection.clone(), table, columns.clone());
    let rows = database
        .export(&request)
        .await
        .map_err(|e| WorkflowError::service("export", e))?;

    let written = sink
        .write(output_path, session.file.delimiter, &columns, &rows)
        .await?;

    info!(table = %table, output = %output_path, records = written, "Export finished");
    Ok(written)
}

async fn import_from_file<D, F>(
    session: &mut SessionState,
    database: &D,
    files: &F,
) -> WorkflowResult<usize>
where
    D: DatabaseService + ?Sized,
    F: FileService + ?Sized,
{
    let table = session
        .import_table()
        .ok_or_else(|| WorkflowError::precondition(SELECT_FILE_FIRST))?;

    let file_path = ensure_uploaded(session, files, WorkflowError::Upload).await?;

    let request = ImportRequest {
        config: session.connection.clone(),
        table,
        columns: session.selected_columns(),
        file_path,
        delimiter: session.file.delimiter,
    };
    let imported = database
        .import(&request)
        .await
        .map_err(|e| WorkflowError::service("import", e))?;

    info!(table = %request.table, records = imported, "Import finished");
    Ok(imported)
}
