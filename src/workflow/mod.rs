//! Ingestion workflow controller
//!
//! [`Workflow`] owns one session: source/target selection, connection and file
//! parameters, the loaded schema, the column selection, the preview and the
//! single status slot. Steps that talk to the services run through
//! [`runner::TaskRunner`], so at most one of them is in flight and every
//! outcome ends up in [`Workflow::status`].
//!
//! Operations take `&mut self`; a second step cannot start on the same
//! session while one is being awaited.
//!
//! ## Example
//!
//! ```rust,no_run
//! use flatfile_bridge::models::{DataKind, FileHandle};
//! use flatfile_bridge::service::api::ApiClient;
//! use flatfile_bridge::workflow::Workflow;
//!
//! # async fn example() {
//! let client = ApiClient::new("http://localhost:8080/api");
//! let mut workflow = Workflow::new(client.clone(), client);
//!
//! workflow.set_source(DataKind::File).await;
//! workflow
//!     .select_file(Some(FileHandle::new("sales.csv", "id,amount\n1,9.5\n")))
//!     .await;
//! workflow.start_ingestion().await;
//! println!("{:?}", workflow.status().message);
//! # }
//! ```

pub mod error;
pub mod ingest;
pub mod naming;
pub mod preview;
pub mod runner;
pub mod schema;
pub mod selection;
pub mod session;

pub use error::{WorkflowError, WorkflowResult};
pub use runner::{BusyGuard, TaskRunner};
pub use selection::ColumnSelection;
pub use session::SessionState;

use tokio::sync::watch;
use tracing::{Instrument, debug, info_span, warn};
use uuid::Uuid;

use crate::models::{
    ConnectionProfile, FileHandle, OperationStatus, SourceKind, StatusMessage, TargetKind,
};
use crate::service::{DatabaseService, FileService};
use crate::sink::{CsvFileSink, ExportSink};

/// Guided ingestion session over a database and a file service
pub struct Workflow<D, F> {
    session_id: Uuid,
    session: SessionState,
    status: OperationStatus,
    updates: watch::Sender<OperationStatus>,
    database: D,
    files: F,
    sink: Box<dyn ExportSink>,
}

impl<D, F> Workflow<D, F>
where
    D: DatabaseService,
    F: FileService,
{
    /// Create a session with default parameters, reading from the database
    pub fn new(database: D, files: F) -> Self {
        let (updates, _) = watch::channel(OperationStatus::default());
        Self {
            session_id: Uuid::new_v4(),
            session: SessionState::default(),
            status: OperationStatus::default(),
            updates,
            database,
            files,
            sink: Box::new(CsvFileSink::new()),
        }
    }

    /// Replace the writer used for database exports (builder pattern)
    pub fn with_sink(mut self, sink: impl ExportSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Start from a prepared session (builder pattern)
    pub fn with_session(mut self, session: SessionState) -> Self {
        self.session = session;
        self
    }

    /// Identifier attached to this session's log spans
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn status(&self) -> &OperationStatus {
        &self.status
    }

    /// Receiver observing every status transition, including busy changes
    /// published while a step is awaiting a service
    pub fn subscribe(&self) -> watch::Receiver<OperationStatus> {
        self.updates.subscribe()
    }

    pub fn database(&self) -> &D {
        &self.database
    }

    pub fn files(&self) -> &F {
        &self.files
    }

    pub fn source(&self) -> SourceKind {
        self.session.source()
    }

    pub fn target(&self) -> TargetKind {
        self.session.target()
    }

    fn publish(&mut self) {
        self.updates.send_replace(self.status.clone());
    }

    /// Remove uploads the session no longer references. Failures are only
    /// logged; the status message is left alone.
    async fn cleanup_released(&mut self) {
        for path in self.session.take_released_uploads() {
            match self.files.cleanup(&path).await {
                Ok(()) => debug!(session_id = %self.session_id, path = %path, "Upload removed"),
                Err(e) => warn!(
                    session_id = %self.session_id,
                    path = %path,
                    error = %e,
                    "Failed to remove upload"
                ),
            }
        }
    }

    /// Drop the cached upload of the selected file and remove it from the
    /// server; the file stays selected and is uploaded again when needed
    pub async fn release_upload(&mut self) {
        self.session.release_upload();
        self.cleanup_released().await;
    }

    /// Choose the source kind; the target becomes the other kind.
    ///
    /// Clears tables, the selected table, columns, selection, preview, the
    /// selected file and the status message. A previous upload is removed
    /// from the server.
    pub async fn set_source(&mut self, kind: SourceKind) {
        debug!(session_id = %self.session_id, source = kind.name(), "Source changed");
        self.session.set_source(kind);
        self.status.clear_message();
        self.publish();
        self.cleanup_released().await;
    }

    /// Edit the connection parameters.
    ///
    /// Moving to another host, port or database forgets the discovered tables.
    pub fn update_connection(&mut self, edit: impl FnOnce(&mut ConnectionProfile)) {
        let before = (
            self.session.connection.host.clone(),
            self.session.connection.port,
            self.session.connection.database.clone(),
        );
        edit(&mut self.session.connection);

        let connection = &self.session.connection;
        if before.0 != connection.host
            || before.1 != connection.port
            || before.2 != connection.database
        {
            self.session.clear_tables();
        }
    }

    /// Replace the connection parameters
    pub fn set_connection(&mut self, connection: ConnectionProfile) {
        self.update_connection(|current| *current = connection);
    }

    pub fn set_delimiter(&mut self, delimiter: char) {
        self.session.file.delimiter = delimiter;
    }

    pub fn set_output_path(&mut self, path: impl Into<String>) {
        self.session.file.output_path = path.into();
    }

    /// Override the table file imports write into; `None` restores the name
    /// derived from the file
    pub fn set_target_table(&mut self, table: Option<String>) {
        self.session.set_target_table(table);
    }

    /// `<database>.<table>` for a database target, `[select file]` without a file
    pub fn target_table_display(&self) -> String {
        self.session.target_table_display()
    }

    pub fn can_preview(&self) -> bool {
        !self.status.busy && self.session.can_preview()
    }

    pub fn can_ingest(&self) -> bool {
        !self.status.busy && self.session.can_ingest()
    }

    pub fn dismiss_message(&mut self) {
        self.status.clear_message();
        self.publish();
    }

    pub fn close_preview(&mut self) {
        self.session.close_preview();
    }

    /// Toggle a loaded column; returns whether it is selected afterwards, or
    /// `None` for a name that was not loaded
    pub fn toggle_column(&mut self, name: &str) -> Option<bool> {
        self.session.toggle_column(name)
    }

    pub fn select_all_columns(&mut self) {
        self.session.select_all_columns();
    }

    /// Select exactly the named columns, returning names that were not loaded
    pub fn select_columns<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<String> {
        self.session.select_columns(names)
    }

    /// Connect to the database and list its tables
    pub async fn connect(&mut self) -> bool {
        let span = info_span!("connect", session_id = %self.session_id);
        let Self {
            session,
            status,
            updates,
            database,
            ..
        } = self;

        TaskRunner::new(status, updates)
            .run(
                schema::CONNECT_LABEL,
                schema::CONNECT_FALLBACK,
                schema::connect(session, &*database),
            )
            .instrument(span)
            .await
    }

    /// Choose the source table; a non-empty name loads its columns
    pub async fn select_table(&mut self, table: &str) -> bool {
        if table.is_empty() {
            self.session.set_selected_table("");
            return true;
        }
        self.load_columns_from_table(table).await
    }

    /// Select `table` and load its columns, selecting all of them
    pub async fn load_columns_from_table(&mut self, table: &str) -> bool {
        let span = info_span!("load_columns", session_id = %self.session_id, table = %table);
        self.session.set_selected_table(table);
        let Self {
            session,
            status,
            updates,
            database,
            ..
        } = self;

        TaskRunner::new(status, updates)
            .run(
                schema::TABLE_COLUMNS_LABEL,
                schema::TABLE_COLUMNS_FALLBACK,
                schema::load_from_table(session, &*database),
            )
            .instrument(span)
            .await
    }

    /// Choose the source file; `Some` uploads it and reads its header,
    /// `None` clears the file and its columns
    pub async fn select_file(&mut self, file: Option<FileHandle>) -> bool {
        match file {
            Some(file) => self.load_columns_from_file(file).await,
            None => {
                self.session.set_selected_file(None);
                self.cleanup_released().await;
                true
            }
        }
    }

    /// Select `file`, upload it and load its header columns
    pub async fn load_columns_from_file(&mut self, file: FileHandle) -> bool {
        let span = info_span!("read_header", session_id = %self.session_id, file = %file.name);
        self.session.set_selected_file(Some(file));
        self.cleanup_released().instrument(span.clone()).await;
        let Self {
            session,
            status,
            updates,
            files,
            ..
        } = self;

        let loaded = TaskRunner::new(status, updates)
            .run(
                schema::FILE_COLUMNS_LABEL,
                schema::FILE_COLUMNS_FALLBACK,
                schema::load_from_file(session, &*files),
            )
            .instrument(span.clone())
            .await;

        // a failed header read drops the fresh upload
        self.cleanup_released().instrument(span).await;
        loaded
    }

    /// Fetch a bounded preview of the selected columns
    pub async fn preview(&mut self) -> bool {
        let span = info_span!("preview", session_id = %self.session_id);
        let Self {
            session,
            status,
            updates,
            database,
            files,
            ..
        } = self;

        TaskRunner::new(status, updates)
            .run(
                preview::PREVIEW_LABEL,
                preview::PREVIEW_FALLBACK,
                preview::fetch_preview(session, &*database, &*files),
            )
            .instrument(span)
            .await
    }

    /// Run the export or import for the current selection
    pub async fn start_ingestion(&mut self) -> bool {
        let span = info_span!(
            "ingest",
            session_id = %self.session_id,
            source = self.session.source().name(),
            target = self.session.target().name()
        );
        let Self {
            session,
            status,
            updates,
            database,
            files,
            sink,
            ..
        } = self;

        TaskRunner::new(status, updates)
            .run(
                ingest::INGEST_LABEL,
                ingest::INGEST_FALLBACK,
                ingest::start_ingestion(session, &*database, &*files, &**sink),
            )
            .instrument(span)
            .await
    }

    /// Replace the status message, e.g. for a local notice
    pub fn report(&mut self, message: StatusMessage) {
        self.status.message = Some(message);
        self.publish();
    }
}

#[cfg(feature = "api-backend")]
impl Workflow<crate::service::api::ApiClient, crate::service::api::ApiClient> {
    /// Build a session against the HTTP services named in `config`
    pub fn from_config(
        config: &crate::config::BridgeConfig,
    ) -> crate::service::ServiceResult<Self> {
        let client = config.api_client()?;
        Ok(Self::new(client.clone(), client).with_session(config.session()))
    }
}
