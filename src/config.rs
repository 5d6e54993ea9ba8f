//! Bridge configuration
//!
//! Loaded from a TOML file, then adjusted from the environment. Every field
//! has a default, so an empty file (or no file at all) is a valid
//! configuration.
//!
//! ```toml
//! api_url = "http://localhost:8080/api"
//! request_timeout_secs = 30
//! preview_limit = 100
//!
//! [connection]
//! host = "127.0.0.1"
//! port = 9000
//! database = "default"
//! user = "default"
//!
//! [file]
//! delimiter = ","
//! output_path = "exports/out.csv"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::models::profile::{DEFAULT_DELIMITER, DEFAULT_PORT};
use crate::models::{ConnectionProfile, FileProfile};
use crate::workflow::SessionState;
use crate::workflow::session::DEFAULT_PREVIEW_LIMIT;

/// Default base URL of the ingestion API
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Environment variable overriding [`BridgeConfig::api_url`]
pub const API_URL_ENV: &str = "FLATFILE_BRIDGE_API_URL";

/// Environment variable supplying the connection credential
pub const CREDENTIAL_ENV: &str = "FLATFILE_BRIDGE_CREDENTIAL";

/// Error type for configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid config file {path}: {message}")]
    Parse { path: String, message: String },
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Base URL of the ingestion API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout; unset means requests may wait indefinitely
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Rows requested for a preview
    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,

    #[serde(default)]
    pub connection: ConnectionSection,

    #[serde(default)]
    pub file: FileSection,
}

/// `[connection]` table
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_name")]
    pub database: String,
    #[serde(default = "default_name")]
    pub user: String,
    #[serde(default)]
    pub credential: Option<String>,
}

/// `[file]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSection {
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default)]
    pub output_path: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_preview_limit() -> usize {
    DEFAULT_PREVIEW_LIMIT
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_name() -> String {
    "default".to_string()
}

fn default_delimiter() -> char {
    DEFAULT_DELIMITER
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: None,
            preview_limit: default_preview_limit(),
            connection: ConnectionSection::default(),
            file: FileSection::default(),
        }
    }
}

impl Default for ConnectionSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: default_name(),
            user: default_name(),
            credential: None,
        }
    }
}

impl std::fmt::Debug for ConnectionSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSection")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("credential", &self.credential.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for FileSection {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            output_path: String::new(),
        }
    }
}

impl BridgeConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Self::from_toml(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Defaults adjusted from the environment
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Apply [`API_URL_ENV`] and [`CREDENTIAL_ENV`] when set
    pub fn apply_env(self) -> Self {
        self.with_overrides(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(CREDENTIAL_ENV).ok(),
        )
    }

    /// Apply explicit overrides; empty values are ignored
    pub fn with_overrides(mut self, api_url: Option<String>, credential: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
        if let Some(credential) = credential.filter(|c| !c.is_empty()) {
            self.connection.credential = Some(credential);
        }
        self
    }

    pub fn connection_profile(&self) -> ConnectionProfile {
        ConnectionProfile {
            host: self.connection.host.clone(),
            port: self.connection.port,
            database: self.connection.database.clone(),
            user: self.connection.user.clone(),
            credential: self.connection.credential.clone().unwrap_or_default(),
        }
    }

    pub fn file_profile(&self) -> FileProfile {
        FileProfile {
            output_path: self.file.output_path.clone(),
            delimiter: self.file.delimiter,
            selected_file: None,
        }
    }

    /// Fresh session seeded with the configured parameters
    pub fn session(&self) -> SessionState {
        SessionState::new(self.connection_profile(), self.file_profile())
            .with_preview_limit(self.preview_limit)
    }

    /// HTTP client for the configured API
    #[cfg(feature = "api-backend")]
    pub fn api_client(&self) -> crate::service::ServiceResult<crate::service::api::ApiClient> {
        use crate::service::api::ApiClient;

        match self.request_timeout_secs {
            Some(secs) => ApiClient::with_timeout(self.api_url.as_str(), secs),
            None => Ok(ApiClient::new(self.api_url.as_str())),
        }
    }
}
