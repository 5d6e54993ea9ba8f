//! User-editable column selection

use crate::models::Column;

/// Subset of the loaded columns chosen for preview and ingestion.
///
/// Membership is keyed by column name. Callers keep every member inside the
/// current column list (see [`super::session::SessionState::toggle_column`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSelection {
    columns: Vec<Column>,
}

impl ColumnSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `column` if selected, otherwise add it.
    ///
    /// Returns whether the column is selected afterwards.
    pub fn toggle(&mut self, column: &Column) -> bool {
        match self.columns.iter().position(|c| c.name == column.name) {
            Some(idx) => {
                self.columns.remove(idx);
                false
            }
            None => {
                self.columns.push(column.clone());
                true
            }
        }
    }

    /// Replace the selection with exactly `columns`
    pub fn select_all(&mut self, columns: &[Column]) {
        self.columns = columns.to_vec();
    }

    pub fn clear(&mut self) {
        self.columns.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Selected columns in selection order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", "UInt64", false),
            Column::new("amount", "Float64", true),
            Column::new("ts", "DateTime", false),
        ]
    }

    #[test]
    fn test_select_all_then_toggle_removes_one() {
        let cols = columns();
        let mut selection = ColumnSelection::new();
        selection.select_all(&cols);
        assert_eq!(selection.len(), 3);

        assert!(!selection.toggle(&cols[1]));
        assert_eq!(selection.len(), 2);
        assert!(!selection.contains("amount"));
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let cols = columns();
        for start_selected in [true, false] {
            let mut selection = ColumnSelection::new();
            if start_selected {
                selection.select_all(&cols);
            }
            for column in &cols {
                let before: Vec<bool> = cols.iter().map(|c| selection.contains(&c.name)).collect();
                selection.toggle(column);
                selection.toggle(column);
                let after: Vec<bool> = cols.iter().map(|c| selection.contains(&c.name)).collect();
                assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn test_toggle_matches_by_name() {
        let mut selection = ColumnSelection::new();
        selection.select_all(&[Column::new("id", "UInt64", false)]);
        // Same name, different metadata
        assert!(!selection.toggle(&Column::from_header("id")));
        assert!(selection.is_empty());
    }
}
