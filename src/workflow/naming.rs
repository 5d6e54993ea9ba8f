//! Derived destination table names

use once_cell::sync::Lazy;
use regex::Regex;

/// Shown in place of a target table when no file is selected
pub const NO_FILE_PLACEHOLDER: &str = "[select file]";

static NON_IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").unwrap());

/// Replace every character outside `[A-Za-z0-9_]` with `_`
pub fn sanitize_identifier(value: &str) -> String {
    NON_IDENTIFIER.replace_all(value, "_").into_owned()
}

/// File name up to its first `.`, ignoring leading dots
pub fn file_stem(file_name: &str) -> &str {
    let name = file_name.trim_start_matches('.');
    name.split('.').next().unwrap_or(name)
}

/// Default table for importing `file_name`
///
/// ```rust
/// use flatfile_bridge::workflow::naming::derived_table_name;
///
/// assert_eq!(derived_table_name("sales.csv"), "sales");
/// assert_eq!(derived_table_name("My Report!!.csv"), "My_Report__");
/// ```
pub fn derived_table_name(file_name: &str) -> String {
    sanitize_identifier(file_stem(file_name))
}

/// `<database>.<derived table>` as displayed for a Database target
pub fn target_display_name(database: &str, file_name: Option<&str>) -> String {
    match file_name {
        Some(name) => format!("{}.{}", database, derived_table_name(name)),
        None => NO_FILE_PLACEHOLDER.to_string(),
    }
}
