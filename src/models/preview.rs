//! Preview result

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row as returned by the services: positional cell values
pub type Row = Vec<Value>;

/// A bounded sample of rows for the current selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviewResult {
    /// Column names, in the order cells appear in each row
    pub columns: Vec<String>,
    /// Sampled rows
    pub rows: Vec<Row>,
}

impl PreviewResult {
    /// Pair rows positionally with the given column names
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Build a preview by picking the cells at `positions` out of every row.
    ///
    /// Cells missing from a short row are filled with `null`.
    pub fn project(columns: Vec<String>, positions: &[usize], rows: Vec<Row>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| {
                positions
                    .iter()
                    .map(|&idx| row.get(idx).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    /// Number of sampled rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the preview has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Render a cell the way it is shown to users and written to files.
///
/// Strings are printed without quotes and `null` as an empty string.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
