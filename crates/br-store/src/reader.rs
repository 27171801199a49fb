//! Server-side report reader.
//!
//! [`ReportReader`] pulls single records out of a report directory by key,
//! never loading more than the requested file. What happens when the file is
//! missing depends on the record kind:
//!
//! | Method | Missing file |
//! |---|---|
//! | [`read_metadata`](ReportReader::read_metadata) | [`ReportError::MissingRecord`] |
//! | [`read_component`](ReportReader::read_component) | [`ReportError::MissingRecord`] |
//! | [`read_component_issues`](ReportReader::read_component_issues) | empty list |
//! | [`read_deleted_component_issues`](ReportReader::read_deleted_component_issues) | [`ReportError::MissingRecord`] |
//!
//! A live component without issues simply has no issues file. A deleted
//! component is only looked up because the scanner listed it, so its record
//! must exist.
//!
//! The reader holds no mutable state and caches nothing; it is `Send + Sync`
//! and independent refs can be read from many threads at once.

use std::fs::File;
use std::io::{ErrorKind, Read};

use camino::Utf8Path;
use prost::Message;
use tracing::{debug, trace};

use br_core::{Component, ComponentRef, Issue, Issues, Metadata, ReaderConfig, RecordKey};

use crate::codec;
use crate::error::ReportError;
use crate::layout::ReportLayout;

/// Reads records from one report directory.
#[derive(Debug, Clone)]
pub struct ReportReader {
    layout: ReportLayout,
    config: ReaderConfig,
}

impl ReportReader {
    /// Opens a reader on an existing report directory.
    pub fn open(dir: impl AsRef<Utf8Path>) -> Result<Self, ReportError> {
        Self::open_with_config(dir, ReaderConfig::default())
    }

    /// Opens a reader with an explicit configuration.
    ///
    /// # Errors
    ///
    /// [`ReportError::MissingDirectory`] if `dir` does not exist and
    /// [`ReportError::NotADirectory`] if it is not a directory.
    pub fn open_with_config(
        dir: impl AsRef<Utf8Path>,
        config: ReaderConfig,
    ) -> Result<Self, ReportError> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Err(ReportError::MissingDirectory(dir.to_owned()));
        }
        if !dir.is_dir() {
            return Err(ReportError::NotADirectory(dir.to_owned()));
        }

        debug!(dir = %dir, "Opened report reader");

        Ok(Self {
            layout: ReportLayout::new(dir),
            config,
        })
    }

    /// Returns the layout of the report directory.
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &ReportLayout {
        &self.layout
    }

    /// Reads the metadata record. A report without one is unusable.
    pub fn read_metadata(&self) -> Result<Metadata, ReportError> {
        self.require(RecordKey::Metadata)
    }

    /// Reads the component record for `reference`.
    pub fn read_component(&self, reference: ComponentRef) -> Result<Component, ReportError> {
        self.require(RecordKey::Component(reference))
    }

    /// Reads the issues of a live component, in written order.
    ///
    /// Returns an empty list when the component has no issues record.
    pub fn read_component_issues(&self, reference: ComponentRef) -> Result<Vec<Issue>, ReportError> {
        let envelope: Option<Issues> = self.read_record(RecordKey::ComponentIssues(reference))?;
        Ok(envelope.map(|issues| issues.issues).unwrap_or_default())
    }

    /// Reads the issues envelope of a deleted component, UUID included.
    pub fn read_deleted_component_issues(
        &self,
        reference: ComponentRef,
    ) -> Result<Issues, ReportError> {
        self.require(RecordKey::DeletedComponentIssues(reference))
    }

    /// Lists the refs that have a deleted-component issues record, sorted.
    pub fn deleted_component_refs(&self) -> Result<Vec<ComponentRef>, ReportError> {
        let refs = self
            .layout
            .list_keys()?
            .into_iter()
            .filter_map(|key| match key {
                RecordKey::DeletedComponentIssues(r) => Some(r),
                _ => None,
            })
            .collect();
        Ok(refs)
    }

    fn require<M: Message + Default>(&self, key: RecordKey) -> Result<M, ReportError> {
        debug_assert!(key.kind().is_required(), "{key} is optional");
        self.read_record(key)?.ok_or_else(|| ReportError::MissingRecord {
            key,
            path: self.layout.path(key),
        })
    }

    /// Loads and decodes one record, returning `None` if its file is absent.
    fn read_record<M: Message + Default>(&self, key: RecordKey) -> Result<Option<M>, ReportError> {
        let path = self.layout.path(key);
        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!(%key, "Record absent");
                return Ok(None);
            }
            Err(e) => return Err(ReportError::read(&path, e)),
        };

        let size = file
            .metadata()
            .map_err(|e| ReportError::read(&path, e))?
            .len();
        if size > self.config.max_record_bytes {
            return Err(ReportError::RecordTooLarge {
                key,
                path,
                size,
                limit: self.config.max_record_bytes,
            });
        }

        let mut bytes = Vec::with_capacity(usize::try_from(size).unwrap_or_default());
        file.read_to_end(&mut bytes)
            .map_err(|e| ReportError::read(&path, e))?;

        let message = codec::decode_single(&bytes).map_err(|source| ReportError::Corrupt {
            key,
            path: path.clone(),
            source,
        })?;

        debug!(%key, bytes = bytes.len(), "Read record");
        Ok(Some(message))
    }
}
