//! Bounded row samples for the current selection

use tracing::info;

use super::error::{SELECT_FILE_FIRST, SELECT_TABLE_FIRST, WorkflowError, WorkflowResult};
use super::schema::ensure_uploaded;
use super::session::SessionState;
use crate::models::{DataKind, PreviewResult, StatusMessage};
use crate::service::{DatabaseService, ExportRequest, FileService};

pub const PREVIEW_LABEL: &str = "Fetching preview data";
pub const PREVIEW_FALLBACK: &str = "Failed to fetch preview data";
pub const SELECT_COLUMNS_TO_PREVIEW: &str = "Please select columns to preview.";

/// Fetch a preview of the selected columns and open the preview surface
pub(crate) async fn fetch_preview<D, F>(
    session: &mut SessionState,
    database: &D,
    files: &F,
) -> WorkflowResult<Option<StatusMessage>>
where
    D: DatabaseService + ?Sized,
    F: FileService + ?Sized,
{
    if session.selection().is_empty() {
        return Err(WorkflowError::precondition(SELECT_COLUMNS_TO_PREVIEW));
    }
    match session.source() {
        DataKind::Database if session.selected_table().is_empty() => {
            return Err(WorkflowError::precondition(SELECT_TABLE_FIRST));
        }
        DataKind::File if session.selected_file().is_none() => {
            return Err(WorkflowError::precondition(SELECT_FILE_FIRST));
        }
        _ => {}
    }

    session.discard_preview();
    let columns = session.selected_column_names();
    let limit = session.preview_limit();

    let preview = match session.source() {
        DataKind::Database => {
            let request = ExportRequest::new(
                session.connection.clone(),
                session.selected_table(),
                columns.clone(),
            )
            .with_limit(limit);
            let rows = database
                .export(&request)
                .await
                .map_err(|e| WorkflowError::service("export", e))?;
            PreviewResult::new(columns, rows)
        }
        DataKind::File => {
            let path =
                ensure_uploaded(session, files, |e| WorkflowError::service("upload", e)).await?;
            let rows = files
                .preview(&path, session.file.delimiter, limit)
                .await
                .map_err(|e| WorkflowError::service("file preview", e))?;
            PreviewResult::project(columns, &session.selected_positions(), rows)
        }
    };

    info!(
        source = session.source().name(),
        rows = preview.len(),
        "Preview fetched"
    );
    session.set_preview(preview);
    Ok(None)
}
