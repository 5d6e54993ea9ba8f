//! Output formatting for CLI

use flatfile_bridge::models::preview::cell_text;
use flatfile_bridge::{Column, OperationStatus, PreviewResult};

/// One line per table
pub fn format_tables(tables: &[String]) -> String {
    tables.iter().map(|t| format!("{}\n", t)).collect()
}

/// One line per column with its type
pub fn format_columns(columns: &[Column]) -> String {
    let width = columns.iter().map(|c| c.name.len()).max().unwrap_or(0);
    columns
        .iter()
        .map(|c| format!("{:<width$}  {}\n", c.name, c.describe(), width = width))
        .collect()
}

/// Aligned text table of a preview
pub fn format_preview(preview: &PreviewResult) -> String {
    if preview.is_empty() {
        return "No data to preview or data is empty.\n".to_string();
    }

    let cells: Vec<Vec<String>> = preview
        .rows
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    let mut widths: Vec<usize> = preview.columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (idx, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(idx) {
                Some(width) => *width = (*width).max(len),
                None => widths.push(len),
            }
        }
    }

    let mut output = format_line(&preview.columns, &widths);
    output.push_str(&format_line(
        &widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>(),
        &widths,
    ));
    for row in &cells {
        output.push_str(&format_line(row, &widths));
    }
    output
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    format!("{}\n", line.trim_end())
}

/// `severity: text` for the final status, if any
pub fn format_status(status: &OperationStatus) -> Option<String> {
    status
        .message
        .as_ref()
        .map(|m| format!("{}: {}", m.severity, m.text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatfile_bridge::StatusMessage;
    use serde_json::json;

    #[test]
    fn test_format_preview_aligns_columns() {
        let preview = PreviewResult::new(
            vec!["id".to_string(), "name".to_string()],
            vec![vec![json!(1), json!("Alice")], vec![json!(22), json!(null)]],
        );
        assert_eq!(
            format_preview(&preview),
            "id  name\n--  -----\n1   Alice\n22\n"
        );
    }

    #[test]
    fn test_format_empty_preview() {
        let preview = PreviewResult::new(vec!["id".to_string()], vec![]);
        assert!(format_preview(&preview).starts_with("No data"));
    }

    #[test]
    fn test_format_columns() {
        let columns = vec![
            Column::new("id", "UInt64", false),
            Column::from_header("amount"),
        ];
        assert_eq!(
            format_columns(&columns),
            "id      Type: UInt64\namount  Type: String (Nullable)\n"
        );
    }

    #[test]
    fn test_format_status() {
        let mut status = OperationStatus::default();
        assert_eq!(format_status(&status), None);
        status.message = Some(StatusMessage::success("Successfully processed 3 records"));
        assert_eq!(
            format_status(&status).as_deref(),
            Some("success: Successfully processed 3 records")
        );
    }
}
