//! Connection and file parameters
//!
//! Both profiles are freely editable and are only validated by the service
//! that consumes them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default ClickHouse native protocol port
pub const DEFAULT_PORT: u16 = 9000;

/// Default field delimiter for flat files
pub const DEFAULT_DELIMITER: char = ',';

/// ClickHouse connection parameters
///
/// Serialized with the field names expected by the service
/// (`host`, `port`, `database`, `user`, `jwtToken`).
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionProfile {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    /// Password or JWT token, passed through untouched
    #[serde(rename = "jwtToken")]
    pub credential: String,
}

impl Default for ConnectionProfile {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            database: "default".to_string(),
            user: "default".to_string(),
            credential: String::new(),
        }
    }
}

impl ConnectionProfile {
    /// Set the port from free-form user input.
    ///
    /// Only the leading digits are used. Input without any leading digit
    /// (or out of range) yields 0, which the service replaces with its
    /// default port.
    pub fn set_port_input(&mut self, input: &str) {
        self.port = parse_port(input);
    }

    /// `host:port` for display and logging
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("credential", &"[REDACTED]")
            .finish()
    }
}

fn parse_port(input: &str) -> u16 {
    let digits: String = input
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// A file picked for upload: its client-visible name and its content
#[derive(Clone, PartialEq, Eq)]
pub struct FileHandle {
    /// Name as seen by the user (e.g. `sales.csv`)
    pub name: String,
    /// Raw bytes sent to the upload endpoint
    pub content: Vec<u8>,
}

impl FileHandle {
    /// Create a handle from in-memory content
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read a local file into a handle named after its file name
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, content })
    }

    /// Content size in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the file has no content
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("name", &self.name)
            .field("bytes", &self.content.len())
            .finish()
    }
}

/// Flat file parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProfile {
    /// Destination path for database exports
    pub output_path: String,
    /// Single-character field delimiter
    pub delimiter: char,
    /// File currently chosen as source, if any
    pub selected_file: Option<FileHandle>,
}

impl Default for FileProfile {
    fn default() -> Self {
        Self {
            output_path: String::new(),
            delimiter: DEFAULT_DELIMITER,
            selected_file: None,
        }
    }
}
