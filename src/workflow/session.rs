//! Per-session workflow state
//!
//! `SessionState` owns everything the workflow steps read and mutate. The
//! source kind and everything derived from it are private so that the reset
//! cascade in [`SessionState::set_source`] cannot be bypassed.

use crate::models::{
    Column, ConnectionProfile, DataKind, FileHandle, FileProfile, PreviewResult, SourceKind,
    TargetKind,
};

use super::naming;
use super::selection::ColumnSelection;

/// Default number of rows requested for a preview
pub const DEFAULT_PREVIEW_LIMIT: usize = 100;

/// State of one ingestion session
#[derive(Debug, Clone)]
pub struct SessionState {
    source: SourceKind,
    /// Database connection parameters; editable at any time
    pub connection: ConnectionProfile,
    /// Flat-file parameters; the selected file is managed through
    /// [`SessionState::set_selected_file`]
    pub file: FileProfile,
    tables: Vec<String>,
    selected_table: String,
    target_table: Option<String>,
    columns: Vec<Column>,
    selection: ColumnSelection,
    preview: Option<PreviewResult>,
    preview_open: bool,
    uploaded_path: Option<String>,
    released_uploads: Vec<String>,
    preview_limit: usize,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(ConnectionProfile::default(), FileProfile::default())
    }
}

impl SessionState {
    /// Start a session reading from the database
    pub fn new(connection: ConnectionProfile, file: FileProfile) -> Self {
        Self {
            source: DataKind::Database,
            connection,
            file,
            tables: Vec::new(),
            selected_table: String::new(),
            target_table: None,
            columns: Vec::new(),
            selection: ColumnSelection::new(),
            preview: None,
            preview_open: false,
            uploaded_path: None,
            released_uploads: Vec::new(),
            preview_limit: DEFAULT_PREVIEW_LIMIT,
        }
    }

    /// Set the preview row limit (builder pattern)
    pub fn with_preview_limit(mut self, limit: usize) -> Self {
        self.preview_limit = limit;
        self
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    /// Always the complement of [`SessionState::source`]
    pub fn target(&self) -> TargetKind {
        self.source.other()
    }

    /// Switch the source kind and reset everything loaded for the old one.
    ///
    /// The connection and file parameters are kept; the selected file is not.
    pub fn set_source(&mut self, kind: SourceKind) {
        self.source = kind;
        self.clear_tables();
        self.file.selected_file = None;
        self.release_upload();
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub(crate) fn set_tables(&mut self, tables: Vec<String>) {
        self.tables = tables;
    }

    /// Forget the table list and everything loaded from it
    pub fn clear_tables(&mut self) {
        self.tables.clear();
        self.selected_table.clear();
        self.clear_schema();
    }

    /// Currently selected source table, empty when none
    pub fn selected_table(&self) -> &str {
        &self.selected_table
    }

    /// Store the source table and drop the columns loaded for the previous one
    pub fn set_selected_table(&mut self, table: impl Into<String>) {
        self.selected_table = table.into();
        self.clear_schema();
    }

    pub fn selected_file(&self) -> Option<&FileHandle> {
        self.file.selected_file.as_ref()
    }

    /// Store the file to read from; a different file invalidates any upload
    /// and the columns loaded from the previous file
    pub fn set_selected_file(&mut self, file: Option<FileHandle>) {
        self.file.selected_file = file;
        self.release_upload();
        self.clear_schema();
    }

    /// Explicit destination table for file imports
    pub fn target_table(&self) -> Option<&str> {
        self.target_table.as_deref()
    }

    /// Override the destination table; blank input restores the derived name
    pub fn set_target_table(&mut self, table: Option<String>) {
        self.target_table = table.filter(|t| !t.trim().is_empty());
    }

    /// Table a file import writes into
    pub fn import_table(&self) -> Option<String> {
        if let Some(table) = &self.target_table {
            return Some(table.clone());
        }
        self.selected_file()
            .map(|file| naming::derived_table_name(&file.name))
    }

    /// `<database>.<table>` shown for a database target
    pub fn target_table_display(&self) -> String {
        match &self.target_table {
            Some(table) if self.selected_file().is_some() => {
                format!("{}.{}", self.connection.database, table)
            }
            _ => naming::target_display_name(
                &self.connection.database,
                self.selected_file().map(|f| f.name.as_str()),
            ),
        }
    }

    /// Server-side path of the selected file once uploaded
    pub fn uploaded_path(&self) -> Option<&str> {
        self.uploaded_path.as_deref()
    }

    pub(crate) fn set_uploaded_path(&mut self, path: String) {
        self.uploaded_path = Some(path);
    }

    /// Drop the selected file and its upload after a failed read
    pub(crate) fn forget_file(&mut self) {
        self.file.selected_file = None;
        self.release_upload();
    }

    /// Forget the server-side upload, queueing its path for removal
    pub fn release_upload(&mut self) {
        if let Some(path) = self.uploaded_path.take() {
            self.released_uploads.push(path);
        }
    }

    /// Server-side paths no longer referenced by the session
    pub fn released_uploads(&self) -> &[String] {
        &self.released_uploads
    }

    pub(crate) fn take_released_uploads(&mut self) -> Vec<String> {
        std::mem::take(&mut self.released_uploads)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Replace the column list and select every column
    pub(crate) fn set_columns(&mut self, columns: Vec<Column>) {
        self.selection.select_all(&columns);
        self.columns = columns;
        self.discard_preview();
    }

    /// Drop columns, selection and preview
    pub fn clear_schema(&mut self) {
        self.columns.clear();
        self.selection.clear();
        self.discard_preview();
    }

    pub fn selection(&self) -> &ColumnSelection {
        &self.selection
    }

    /// Toggle a loaded column by name.
    ///
    /// Returns `None` when no loaded column has that name, otherwise whether
    /// it is selected afterwards.
    pub fn toggle_column(&mut self, name: &str) -> Option<bool> {
        let column = self.columns.iter().find(|c| c.name == name)?.clone();
        let selected = self.selection.toggle(&column);
        self.discard_preview();
        Some(selected)
    }

    /// Select every loaded column
    pub fn select_all_columns(&mut self) {
        self.selection.select_all(&self.columns);
        self.discard_preview();
    }

    /// Select exactly the loaded columns named in `names`.
    ///
    /// Returns the names that matched no loaded column.
    pub fn select_columns<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<String> {
        self.selection.clear();
        let mut unknown = Vec::new();
        for name in names {
            let name = name.as_ref();
            match self.columns.iter().find(|c| c.name == name) {
                Some(column) if !self.selection.contains(name) => {
                    self.selection.toggle(column);
                }
                Some(_) => {}
                None => unknown.push(name.to_string()),
            }
        }
        self.discard_preview();
        unknown
    }

    /// Selected columns in load order
    pub fn selected_columns(&self) -> Vec<Column> {
        self.columns
            .iter()
            .filter(|c| self.selection.contains(&c.name))
            .cloned()
            .collect()
    }

    /// Names of the selected columns in load order
    pub fn selected_column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| self.selection.contains(&c.name))
            .map(|c| c.name.clone())
            .collect()
    }

    /// Load-order positions of the selected columns
    pub fn selected_positions(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| self.selection.contains(&c.name))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn preview(&self) -> Option<&PreviewResult> {
        self.preview.as_ref()
    }

    /// Whether the preview surface is shown
    pub fn is_preview_open(&self) -> bool {
        self.preview_open
    }

    pub(crate) fn set_preview(&mut self, preview: PreviewResult) {
        self.preview = Some(preview);
        self.preview_open = true;
    }

    pub(crate) fn discard_preview(&mut self) {
        self.preview = None;
        self.preview_open = false;
    }

    pub fn close_preview(&mut self) {
        self.preview_open = false;
    }

    pub fn preview_limit(&self) -> usize {
        self.preview_limit
    }

    /// Whether the preview step has what it needs
    pub fn can_preview(&self) -> bool {
        !self.selection.is_empty()
            && match self.source {
                DataKind::Database => !self.selected_table.is_empty(),
                DataKind::File => self.selected_file().is_some(),
            }
    }

    /// Whether the ingestion step has what it needs
    pub fn can_ingest(&self) -> bool {
        self.can_preview()
            && match self.source {
                DataKind::Database => !self.file.output_path.trim().is_empty(),
                DataKind::File => true,
            }
    }
}
