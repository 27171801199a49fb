//! Configuration structures for report storage.
//!
//! - [`WriterConfig`] - Scanner-side writer behavior (duplicates, durability)
//! - [`ReaderConfig`] - Server-side reader limits
//! - [`StoreConfig`] - Root configuration combining both
//!
//! All configuration types implement [`Default`] and deserialize with missing
//! fields falling back to those defaults.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What a writer does when the same record key is written twice.
///
/// Metadata is always overwritable; this policy applies to component,
/// issues and deleted-issues records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateRefPolicy {
    /// Fail the second write with a duplicate-record error.
    #[default]
    Reject,
    /// Last write wins; a warning is logged.
    Overwrite,
}

/// Configuration for the report writer.
///
/// # Examples
///
/// ```
/// use br_core::{DuplicateRefPolicy, WriterConfig};
///
/// let config = WriterConfig::default();
/// assert_eq!(config.duplicate_refs, DuplicateRefPolicy::Reject);
/// assert!(!config.sync_on_write);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Handling of repeated writes for the same record key.
    pub duplicate_refs: DuplicateRefPolicy,

    /// Whether to `fsync` each record file after writing it.
    pub sync_on_write: bool,
}

/// Configuration for the report reader.
///
/// # Examples
///
/// ```
/// use br_core::ReaderConfig;
///
/// let config = ReaderConfig::default();
/// assert_eq!(config.max_record_bytes, 512 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Largest record file the reader will load, in bytes.
    pub max_record_bytes: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_record_bytes: 512 * 1024 * 1024,
        }
    }
}

/// Root configuration for report storage.
///
/// # Examples
///
/// ```
/// use br_core::StoreConfig;
///
/// let config: StoreConfig = serde_json::from_str(r#"{"writer": {"sync_on_write": true}}"#).unwrap();
/// assert!(config.writer.sync_on_write);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Writer configuration.
    pub writer: WriterConfig,

    /// Reader configuration.
    pub reader: ReaderConfig,
}

impl StoreConfig {
    /// Loads and validates a configuration from a JSON file.
    pub fn from_json_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks option values that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reader.max_record_bytes == 0 {
            return Err(ConfigError::invalid_option(
                "reader.max_record_bytes",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}
