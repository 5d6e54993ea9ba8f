//! Models module
//!
//! Defines the session-scoped data structures the ingestion workflow operates on.
//! Wire representations follow the JSON shapes of the ClickHouse/file services.

pub mod column;
pub mod kind;
pub mod preview;
pub mod profile;
pub mod status;

pub use column::Column;
pub use kind::{DataKind, SourceKind, TargetKind};
pub use preview::{PreviewResult, Row};
pub use profile::{ConnectionProfile, FileHandle, FileProfile};
pub use status::{OperationStatus, Severity, StatusMessage};
