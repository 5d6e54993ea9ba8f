//! Source and target kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// One side of a transfer: the ClickHouse service or a delimited flat file.
///
/// The workflow keeps exactly one source kind active; the target is always
/// the other variant (see [`DataKind::other`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    /// Columnar database service
    #[default]
    Database,
    /// Delimited flat file
    File,
}

/// Kind of the side data is read from
pub type SourceKind = DataKind;

/// Kind of the side data is written to
pub type TargetKind = DataKind;

impl DataKind {
    /// The complementary kind
    pub fn other(self) -> Self {
        match self {
            DataKind::Database => DataKind::File,
            DataKind::File => DataKind::Database,
        }
    }

    /// Short name used in labels and logs
    pub fn name(self) -> &'static str {
        match self {
            DataKind::Database => "clickhouse",
            DataKind::File => "file",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataKind::Database => write!(f, "ClickHouse"),
            DataKind::File => write!(f, "Flat File"),
        }
    }
}
