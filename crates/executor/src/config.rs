//! Session configuration via `sqlbridge.toml`
//!
//! A [`SessionConfig`] is either built in code or read from a TOML file.
//! Unknown keys are rejected so a misspelt setting fails loudly.

use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlbridge_core::{ConvertContext, EpochAnchor, IsolationLevel, DEFAULT_BLOB_CHUNK_SIZE};

use crate::{Error, Result};

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "sqlbridge.toml";

/// Connection string for a private in-memory database
pub const IN_MEMORY_URL: &str = "sqlite:mem:";

/// Session settings.
///
/// # Example
///
/// ```toml
/// connection_string = "sqlite:file:/var/lib/app/data.db"
/// default_isolation = "read_committed"
/// # epoch_anchor = "1970-01-01T00:00:00"
/// blob_chunk_size = 8192
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Driver connection string
    pub connection_string: String,
    /// Isolation used by `begin_transaction(None)`
    #[serde(default)]
    pub default_isolation: IsolationLevel,
    /// Reference instant for date/time values; the Unix epoch when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch_anchor: Option<NaiveDateTime>,
    /// Read size for BLOB streams
    #[serde(default = "default_blob_chunk_size")]
    pub blob_chunk_size: usize,
}

fn default_blob_chunk_size() -> usize {
    DEFAULT_BLOB_CHUNK_SIZE
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(IN_MEMORY_URL)
    }
}

impl SessionConfig {
    /// Config for `connection_string` with default settings
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            default_isolation: IsolationLevel::default(),
            epoch_anchor: None,
            blob_chunk_size: DEFAULT_BLOB_CHUNK_SIZE,
        }
    }

    /// Private in-memory database
    pub fn in_memory() -> Self {
        Self::new(IN_MEMORY_URL)
    }

    pub fn with_isolation(mut self, level: IsolationLevel) -> Self {
        self.default_isolation = level;
        self
    }

    pub fn with_epoch_anchor(mut self, anchor: NaiveDateTime) -> Self {
        self.epoch_anchor = Some(anchor);
        self
    }

    /// Converter settings derived from this config
    pub fn convert_context(&self) -> ConvertContext {
        ConvertContext {
            anchor: self.epoch_anchor.map(EpochAnchor::new).unwrap_or_default(),
            blob_chunk_size: self.blob_chunk_size,
        }
    }

    /// Check the settings that can be checked without a driver.
    pub fn validate(&self) -> Result<()> {
        if self.blob_chunk_size == 0 {
            return Err(Error::config("blob_chunk_size must be greater than zero"));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# sqlbridge session configuration
#
# Connection string for the embedded engine:
#   sqlite:mem:          private in-memory database
#   sqlite:mem:<name>    named in-memory database shared by name
#   sqlite:file:<path>   file-backed database
# Flags follow as ;KEY=VALUE (READONLY=TRUE, IFEXISTS=TRUE).
connection_string = "sqlite:mem:"

# Isolation for transactions begun without an explicit level:
#   "unspecified", "read_uncommitted", "read_committed",
#   "repeatable_read", "serializable"
default_isolation = "unspecified"

# Reference instant for date/time values (default: the Unix epoch).
# Data must be read back with the same anchor it was written with.
# epoch_anchor = "1970-01-01T00:00:00"

# Read size for BLOB streams, in bytes.
blob_chunk_size = 8192
"#
    }

    /// Parse config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SessionConfig = toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config { reason } => {
                Error::config(format!("{} (in '{}')", reason, path.display()))
            }
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
