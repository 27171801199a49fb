//! Error types for the br-store crate.
//!
//! This module provides the [`ReportError`] type for everything that can go
//! wrong while writing or reading a report directory.

use camino::Utf8PathBuf;

use br_core::RecordKey;

use crate::codec::CodecError;

/// Errors that can occur during report writing and reading.
///
/// # Error Categories
///
/// - **Structural** ([`is_structural`](Self::is_structural)): a required record
///   is missing, corrupt, or oversized. The report cannot be trusted.
/// - **I/O** ([`is_io`](Self::is_io)): the environment failed (directory cannot
///   be created, a file cannot be read or written). The caller decides whether
///   to retry the whole step.
/// - **Usage**: the caller broke a writer precondition (duplicate key, record
///   without a reference).
///
/// Absence of an optional record is not an error and never produces a
/// `ReportError`.
///
/// # Examples
///
/// ```
/// use br_core::{ComponentRef, RecordKey};
/// use br_store::ReportError;
///
/// let err = ReportError::MissingRecord {
///     key: RecordKey::Component(ComponentRef::new(666)),
///     path: "report/component-666.pb".into(),
/// };
/// assert!(err.is_structural());
/// assert!(err.to_string().contains("component #666"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The report directory does not exist.
    #[error("report directory does not exist: {0}")]
    MissingDirectory(Utf8PathBuf),

    /// The report path exists but is not a directory.
    #[error("report path is not a directory: {0}")]
    NotADirectory(Utf8PathBuf),

    /// The report directory could not be created.
    #[error("failed to create report directory {path}: {source}")]
    CreateDirectory {
        /// The directory that could not be created.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A required record is absent.
    #[error("missing {key} record: {path} not found")]
    MissingRecord {
        /// The key of the missing record.
        key: RecordKey,
        /// The path the record was expected at.
        path: Utf8PathBuf,
    },

    /// A file or directory could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The path that could not be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A record file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// The path that could not be written.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A record file exists but does not decode.
    #[error("corrupt {key} record in {path}: {source}")]
    Corrupt {
        /// The key of the corrupt record.
        key: RecordKey,
        /// The corrupt file.
        path: Utf8PathBuf,
        /// The framing or decoding failure.
        #[source]
        source: CodecError,
    },

    /// A record file is larger than the configured reader limit.
    #[error("{key} record in {path} is {size} bytes, limit is {limit}")]
    RecordTooLarge {
        /// The key of the oversized record.
        key: RecordKey,
        /// The oversized file.
        path: Utf8PathBuf,
        /// Actual file size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// The same record key was written twice by one writer.
    #[error("{0} record was already written to this report")]
    DuplicateRecord(RecordKey),

    /// A record handed to the writer is missing a mandatory field.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

impl ReportError {
    /// Creates a new [`ReportError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ReportError::Write`] error.
    #[inline]
    pub fn write(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if the report itself is missing data or malformed.
    #[inline]
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::MissingRecord { .. } | Self::Corrupt { .. } | Self::RecordTooLarge { .. }
        )
    }

    /// Returns `true` if the failure came from the filesystem environment.
    #[inline]
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(
            self,
            Self::MissingDirectory(_)
                | Self::NotADirectory(_)
                | Self::CreateDirectory { .. }
                | Self::Read { .. }
                | Self::Write { .. }
        )
    }

    /// Returns the record key associated with this error, if any.
    #[must_use]
    pub const fn key(&self) -> Option<RecordKey> {
        match self {
            Self::MissingRecord { key, .. }
            | Self::Corrupt { key, .. }
            | Self::RecordTooLarge { key, .. }
            | Self::DuplicateRecord(key) => Some(*key),
            _ => None,
        }
    }

    /// Returns the filesystem path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::MissingDirectory(path) | Self::NotADirectory(path) => Some(path),
            Self::CreateDirectory { path, .. }
            | Self::MissingRecord { path, .. }
            | Self::Read { path, .. }
            | Self::Write { path, .. }
            | Self::Corrupt { path, .. }
            | Self::RecordTooLarge { path, .. } => Some(path),
            Self::DuplicateRecord(_) | Self::InvalidRecord(_) => None,
        }
    }
}
