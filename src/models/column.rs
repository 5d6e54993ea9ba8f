//! Column model

use serde::{Deserialize, Serialize};

/// Type assigned to columns read from a file header.
///
/// File headers carry no type information, so every file column is reported
/// with this generic type instead of an inferred one.
pub const UNTYPED_COLUMN_TYPE: &str = "String";

/// A column discovered by a schema load
///
/// # Example
///
/// ```rust
/// use flatfile_bridge::models::Column;
///
/// let column = Column::new("id", "UInt64", false);
/// assert_eq!(column.name, "id");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Column {
    /// Column name, unique within one load
    pub name: String,
    /// Type as reported by the source (e.g. "UInt64", "Nullable(String)")
    #[serde(rename = "type")]
    pub data_type: String,
    /// Whether the column accepts NULL values
    #[serde(default)]
    pub nullable: bool,
}

impl Column {
    /// Create a new column
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
        }
    }

    /// Column built from a file header entry
    pub fn from_header(name: impl Into<String>) -> Self {
        Self::new(name, UNTYPED_COLUMN_TYPE, true)
    }

    /// One-line description, e.g. `Type: String (Nullable)`
    pub fn describe(&self) -> String {
        if self.nullable {
            format!("Type: {} (Nullable)", self.data_type)
        } else {
            format!("Type: {}", self.data_type)
        }
    }
}
