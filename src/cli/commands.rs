//! Subcommand handlers
//!
//! Each handler drives one [`Workflow`] through the same steps a user would
//! take and stops at the first step that does not succeed. The final status
//! is left on the workflow for the caller to report. Commands that upload a
//! file remove it from the server before returning.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use flatfile_bridge::{
    ApiClient, DataKind, DatabaseService, FileHandle, FileService, StatusMessage, Workflow,
};

use crate::args::{ColumnsArgs, ConnectionArgs, ExportArgs, ImportArgs, PreviewArgs};
use crate::output;

pub type CliWorkflow = Workflow<ApiClient, ApiClient>;

/// Apply connection flags on top of the configured profile
pub fn apply_connection(workflow: &mut CliWorkflow, args: &ConnectionArgs) {
    workflow.update_connection(|connection| {
        if let Some(host) = &args.host {
            connection.host = host.clone();
        }
        if let Some(port) = &args.port {
            connection.set_port_input(port);
        }
        if let Some(database) = &args.database {
            connection.database = database.clone();
        }
        if let Some(user) = &args.user {
            connection.user = user.clone();
        }
        if let Some(credential) = &args.credential {
            connection.credential = credential.clone();
        }
    });
}

/// `tables`
pub async fn handle_tables(workflow: &mut CliWorkflow) -> Result<()> {
    workflow.set_source(DataKind::Database).await;
    if workflow.connect().await {
        print!("{}", output::format_tables(workflow.session().tables()));
    }
    Ok(())
}

/// `columns`
pub async fn handle_columns(workflow: &mut CliWorkflow, args: &ColumnsArgs) -> Result<()> {
    let loaded = load_source(
        workflow,
        args.source.table.as_deref(),
        args.source.file.as_deref(),
        args.delimiter,
    )
    .await?;
    if loaded {
        print!("{}", output::format_columns(workflow.session().columns()));
    }
    workflow.release_upload().await;
    Ok(())
}

/// `preview`
pub async fn handle_preview(workflow: &mut CliWorkflow, args: &PreviewArgs) -> Result<()> {
    let loaded = load_source(
        workflow,
        args.source.table.as_deref(),
        args.source.file.as_deref(),
        args.delimiter,
    )
    .await?;
    if loaded
        && select(workflow, &args.columns)
        && workflow.preview().await
        && let Some(preview) = workflow.session().preview()
    {
        print!("{}", output::format_preview(preview));
    }
    workflow.release_upload().await;
    Ok(())
}

/// `export`: Database → File
pub async fn handle_export(workflow: &mut CliWorkflow, args: &ExportArgs) -> Result<()> {
    workflow.set_source(DataKind::Database).await;
    workflow.set_output_path(args.output.as_str());
    if let Some(delimiter) = args.delimiter {
        workflow.set_delimiter(delimiter);
    }

    if workflow.load_columns_from_table(&args.table).await && select(workflow, &args.columns) {
        workflow.start_ingestion().await;
    }
    Ok(())
}

/// `import`: File → Database
pub async fn handle_import(workflow: &mut CliWorkflow, args: &ImportArgs) -> Result<()> {
    workflow.set_source(DataKind::File).await;
    if let Some(delimiter) = args.delimiter {
        workflow.set_delimiter(delimiter);
    }
    workflow.set_target_table(args.target_table.clone());

    let file = read_file(&args.file).await?;
    if workflow.load_columns_from_file(file).await && select(workflow, &args.columns) {
        debug!(target = %workflow.target_table_display(), "Importing");
        workflow.start_ingestion().await;
    }
    workflow.release_upload().await;
    Ok(())
}

async fn load_source<D, F>(
    workflow: &mut Workflow<D, F>,
    table: Option<&str>,
    file: Option<&Path>,
    delimiter: Option<char>,
) -> Result<bool>
where
    D: DatabaseService,
    F: FileService,
{
    if let Some(delimiter) = delimiter {
        workflow.set_delimiter(delimiter);
    }

    match (table, file) {
        (Some(table), _) => {
            workflow.set_source(DataKind::Database).await;
            Ok(workflow.load_columns_from_table(table).await)
        }
        (None, Some(path)) => {
            workflow.set_source(DataKind::File).await;
            let file = read_file(path).await?;
            Ok(workflow.load_columns_from_file(file).await)
        }
        (None, None) => anyhow::bail!("either --table or --file is required"),
    }
}

/// Narrow the default select-all to `columns` when given.
///
/// Unknown names are reported as a warning and stop the command.
fn select<D, F>(workflow: &mut Workflow<D, F>, columns: &[String]) -> bool
where
    D: DatabaseService,
    F: FileService,
{
    if columns.is_empty() {
        return true;
    }

    let unknown = workflow.select_columns(columns);
    if unknown.is_empty() {
        return true;
    }

    workflow.report(StatusMessage::warning(format!(
        "Unknown columns: {}",
        unknown.join(", ")
    )));
    false
}

async fn read_file(path: &Path) -> Result<FileHandle> {
    FileHandle::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}
