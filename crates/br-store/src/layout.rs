//! Mapping from record keys to files in a report directory.
//!
//! The mapping is a pure function of the [`RecordKey`], so a writer and a
//! reader running in different processes agree on every path without sharing
//! anything but the directory. It is also injective, and
//! [`ReportLayout::parse_file_name`] is its exact inverse:
//!
//! | Key | File name |
//! |---|---|
//! | metadata | `metadata.pb` |
//! | component `n` | `component-<n>.pb` |
//! | issues of component `n` | `component-<n>-issues.pb` |
//! | issues of deleted component `n` | `deleted-component-<n>-issues.pb` |
//!
//! # Examples
//!
//! ```
//! use br_core::{ComponentRef, RecordKey};
//! use br_store::ReportLayout;
//!
//! let layout = ReportLayout::new("/tmp/report");
//! let key = RecordKey::ComponentIssues(ComponentRef::new(12));
//!
//! assert_eq!(layout.path(key).as_str(), "/tmp/report/component-12-issues.pb");
//! assert_eq!(ReportLayout::parse_file_name("component-12-issues.pb"), Some(key));
//! ```

use camino::{Utf8Path, Utf8PathBuf};

use br_core::{ComponentRef, RecordKey};

use crate::error::ReportError;

const EXTENSION: &str = ".pb";
const METADATA_STEM: &str = "metadata";
const COMPONENT_PREFIX: &str = "component-";
const DELETED_PREFIX: &str = "deleted-component-";
const ISSUES_SUFFIX: &str = "-issues";

/// Resolves record keys to paths inside one report directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLayout {
    dir: Utf8PathBuf,
}

impl ReportLayout {
    /// Creates a layout rooted at `dir`. The directory is not touched.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the report directory.
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Returns the file name of a record, relative to the report directory.
    #[must_use]
    pub fn file_name(key: RecordKey) -> String {
        match key {
            RecordKey::Metadata => format!("{METADATA_STEM}{EXTENSION}"),
            RecordKey::Component(r) => format!("{COMPONENT_PREFIX}{}{EXTENSION}", r.as_u32()),
            RecordKey::ComponentIssues(r) => {
                format!("{COMPONENT_PREFIX}{}{ISSUES_SUFFIX}{EXTENSION}", r.as_u32())
            }
            RecordKey::DeletedComponentIssues(r) => {
                format!("{DELETED_PREFIX}{}{ISSUES_SUFFIX}{EXTENSION}", r.as_u32())
            }
        }
    }

    /// Returns the full path of a record.
    #[must_use]
    pub fn path(&self, key: RecordKey) -> Utf8PathBuf {
        self.dir.join(Self::file_name(key))
    }

    /// Recovers the record key from a file name produced by [`file_name`](Self::file_name).
    ///
    /// Returns `None` for any other name, including references written with
    /// leading zeros or signs.
    #[must_use]
    pub fn parse_file_name(name: &str) -> Option<RecordKey> {
        let stem = name.strip_suffix(EXTENSION)?;
        if stem == METADATA_STEM {
            return Some(RecordKey::Metadata);
        }

        if let Some(rest) = stem.strip_prefix(DELETED_PREFIX) {
            let digits = rest.strip_suffix(ISSUES_SUFFIX)?;
            return parse_ref(digits).map(RecordKey::DeletedComponentIssues);
        }

        let rest = stem.strip_prefix(COMPONENT_PREFIX)?;
        match rest.strip_suffix(ISSUES_SUFFIX) {
            Some(digits) => parse_ref(digits).map(RecordKey::ComponentIssues),
            None => parse_ref(rest).map(RecordKey::Component),
        }
    }

    /// Lists every record present in the directory, sorted by key.
    ///
    /// Files that do not follow the naming convention are ignored.
    pub fn list_keys(&self) -> Result<Vec<RecordKey>, ReportError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| ReportError::read(&self.dir, e))?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ReportError::read(&self.dir, e))?;
            if let Some(key) = entry.file_name().to_str().and_then(Self::parse_file_name) {
                keys.push(key);
            }
        }
        keys.sort_unstable();
        Ok(keys)
    }
}

/// Parses a canonical positive decimal reference: digits only, no leading zero.
fn parse_ref(digits: &str) -> Option<ComponentRef> {
    let canonical = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !digits.starts_with('0');
    if !canonical {
        return None;
    }
    digits.parse().ok().map(ComponentRef::new)
}
