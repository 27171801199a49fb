//! Scanner-side report writer.
//!
//! [`ReportWriter`] serializes records into a report directory, one file per
//! record key. All methods take `&self`, so one writer can be shared by
//! parallel analysis workers as long as each worker writes its own refs.
//!
//! # Write-once keys
//!
//! Within one writer instance every component, issues and deleted-issues key
//! may be written once. Under the default
//! [`DuplicateRefPolicy::Reject`] a second write fails with
//! [`ReportError::DuplicateRecord`] and leaves the first file in place; under
//! [`DuplicateRefPolicy::Overwrite`] the last write wins. An empty issue list
//! counts as a write: it claims its key, and under `Overwrite` it removes the
//! file of an earlier non-empty list. Metadata may be rewritten freely.
//! Tracking is per instance: two writers on the same directory do not see
//! each other's keys.
//!
//! Component refs are positive; ref 0 is rejected with
//! [`ReportError::InvalidRecord`].
//!
//! # Examples
//!
//! ```
//! use br_core::{Component, ComponentRef, Issue, Metadata};
//! use br_store::{ReportReader, ReportWriter};
//! use camino::Utf8Path;
//!
//! let temp = tempfile::tempdir().unwrap();
//! let dir = Utf8Path::from_path(temp.path()).unwrap().join("report");
//!
//! let writer = ReportWriter::open(&dir).unwrap();
//! writer.write_metadata(&Metadata {
//!     analysis_date: Some(15_000_000),
//!     root_component_ref: Some(1),
//!     ..Metadata::default()
//! }).unwrap();
//! writer.write_component(&Component::new(ComponentRef::new(1), "UUID_A")).unwrap();
//! writer.write_component_issues(ComponentRef::new(1), vec![Issue::new("ISSUE_A")]).unwrap();
//! let stats = writer.finish();
//! assert_eq!(stats.records(), 3);
//!
//! let reader = ReportReader::open(&dir).unwrap();
//! assert_eq!(reader.read_component_issues(ComponentRef::new(1)).unwrap().len(), 1);
//! ```

use std::fs::File;
use std::io::{BufWriter, ErrorKind};

use camino::Utf8Path;
use parking_lot::Mutex;
use prost::Message;
use tracing::{debug, info, trace, warn};

use br_core::{
    Component, ComponentRef, DuplicateRefPolicy, FxHashSet, Issue, Issues, Metadata, RecordKey,
    WriterConfig, fx_hash_set,
};

use crate::codec;
use crate::error::ReportError;
use crate::layout::ReportLayout;
use crate::stats::{WriteSnapshot, WriteStats};

/// Writes the records of one report into a directory.
#[derive(Debug)]
pub struct ReportWriter {
    layout: ReportLayout,
    config: WriterConfig,
    /// Keys written by this instance, metadata excluded.
    written: Mutex<FxHashSet<RecordKey>>,
    stats: WriteStats,
}

impl ReportWriter {
    /// Opens a writer on `dir` with the default configuration.
    ///
    /// The directory and its parents are created if absent.
    pub fn open(dir: impl AsRef<Utf8Path>) -> Result<Self, ReportError> {
        Self::open_with_config(dir, WriterConfig::default())
    }

    /// Opens a writer on `dir` with an explicit configuration.
    ///
    /// # Errors
    ///
    /// [`ReportError::NotADirectory`] if `dir` exists and is not a directory,
    /// [`ReportError::CreateDirectory`] if it cannot be created.
    pub fn open_with_config(
        dir: impl AsRef<Utf8Path>,
        config: WriterConfig,
    ) -> Result<Self, ReportError> {
        let dir = dir.as_ref();
        if dir.exists() && !dir.is_dir() {
            return Err(ReportError::NotADirectory(dir.to_owned()));
        }
        std::fs::create_dir_all(dir).map_err(|source| ReportError::CreateDirectory {
            path: dir.to_owned(),
            source,
        })?;

        debug!(dir = %dir, ?config, "Opened report writer");

        Ok(Self {
            layout: ReportLayout::new(dir),
            config,
            written: Mutex::new(fx_hash_set()),
            stats: WriteStats::new(),
        })
    }

    /// Returns the layout of the report directory.
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &ReportLayout {
        &self.layout
    }

    /// Returns the writer configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> WriterConfig {
        self.config
    }

    /// Writes the metadata record, replacing any previous one.
    pub fn write_metadata(&self, metadata: &Metadata) -> Result<(), ReportError> {
        let bytes = self.write_record(RecordKey::Metadata, metadata)?;
        self.stats.record_metadata(bytes);
        Ok(())
    }

    /// Writes one component record at the path of its reference.
    ///
    /// # Errors
    ///
    /// [`ReportError::InvalidRecord`] if the component has no reference or
    /// reference 0, and [`ReportError::DuplicateRecord`] if this writer already
    /// wrote it.
    pub fn write_component(&self, component: &Component) -> Result<(), ReportError> {
        let reference = component
            .component_ref()
            .ok_or_else(|| ReportError::InvalidRecord("component has no reference".to_owned()))
            .and_then(positive_ref)?;

        let key = RecordKey::Component(reference);
        let bytes = self.write_claimed(key, component)?;
        self.stats.record_component(bytes);
        Ok(())
    }

    /// Writes the issues of a live component.
    ///
    /// An empty list writes nothing: no file is how a report says a component
    /// has no issues.
    pub fn write_component_issues(
        &self,
        reference: ComponentRef,
        issues: Vec<Issue>,
    ) -> Result<(), ReportError> {
        let key = RecordKey::ComponentIssues(positive_ref(reference)?);
        if issues.is_empty() {
            return self.write_empty(key);
        }

        let count = issues.len() as u64;
        let envelope = Issues::for_component(reference, issues);
        let bytes = self.write_claimed(key, &envelope)?;
        self.stats.record_issue_list(count, bytes);
        Ok(())
    }

    /// Writes the issues of a component deleted since the previous analysis.
    ///
    /// The component UUID travels inside the record because `reference` does
    /// not resolve to a component record in this report. An empty list writes
    /// nothing.
    pub fn write_deleted_component_issues(
        &self,
        reference: ComponentRef,
        component_uuid: &str,
        issues: Vec<Issue>,
    ) -> Result<(), ReportError> {
        let key = RecordKey::DeletedComponentIssues(positive_ref(reference)?);
        if issues.is_empty() {
            return self.write_empty(key);
        }

        let count = issues.len() as u64;
        let envelope = Issues::for_deleted_component(reference, component_uuid, issues);
        let bytes = self.write_claimed(key, &envelope)?;
        self.stats.record_deleted_issue_list(count, bytes);
        Ok(())
    }

    /// Returns a snapshot of what this writer has written so far.
    #[must_use]
    pub fn stats(&self) -> WriteSnapshot {
        self.stats.snapshot()
    }

    /// Consumes the writer and returns its final statistics.
    pub fn finish(self) -> WriteSnapshot {
        let snapshot = self.stats.snapshot();
        if snapshot.metadata == 0 {
            warn!(dir = %self.layout.dir(), "Report finished without a metadata record");
        }
        info!(
            dir = %self.layout.dir(),
            components = snapshot.components,
            issue_lists = snapshot.issue_lists,
            deleted_issue_lists = snapshot.deleted_issue_lists,
            issues = snapshot.issues,
            bytes = snapshot.bytes,
            "Report written"
        );
        snapshot
    }

    /// Claims `key`, writes the record, and releases the claim if the write fails.
    fn write_claimed<M: Message>(&self, key: RecordKey, message: &M) -> Result<u64, ReportError> {
        let newly_claimed = self.claim(key)?;
        let result = self.write_record(key, message);
        if result.is_err() && newly_claimed {
            self.written.lock().remove(&key);
        }
        result
    }

    /// Claims `key` for an empty issue list, which is stored as no file.
    fn write_empty(&self, key: RecordKey) -> Result<(), ReportError> {
        if !self.claim(key)? {
            // Overwrite of an earlier list: drop its file so the empty list wins.
            let path = self.layout.path(key);
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(%key, path = %path, "Removed overwritten issue list"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(ReportError::write(&path, e)),
            }
        }
        trace!(%key, "Skipping empty issue list");
        self.stats.record_skipped_empty();
        Ok(())
    }

    /// Returns whether this call claimed `key` for the first time.
    fn claim(&self, key: RecordKey) -> Result<bool, ReportError> {
        if self.written.lock().insert(key) {
            return Ok(true);
        }
        match self.config.duplicate_refs {
            DuplicateRefPolicy::Reject => Err(ReportError::DuplicateRecord(key)),
            DuplicateRefPolicy::Overwrite => {
                warn!(%key, "Overwriting record already written to this report");
                Ok(false)
            }
        }
    }

    fn write_record<M: Message>(&self, key: RecordKey, message: &M) -> Result<u64, ReportError> {
        let path = self.layout.path(key);
        let file = File::create(&path).map_err(|e| ReportError::write(&path, e))?;

        let mut out = BufWriter::new(file);
        let bytes = codec::write_delimited(&mut out, message).map_err(|e| ReportError::write(&path, e))?;
        let file = out
            .into_inner()
            .map_err(|e| ReportError::write(&path, e.into_error()))?;
        if self.config.sync_on_write {
            file.sync_all().map_err(|e| ReportError::write(&path, e))?;
        }

        debug!(%key, path = %path, bytes, "Wrote record");
        Ok(bytes as u64)
    }
}

fn positive_ref(reference: ComponentRef) -> Result<ComponentRef, ReportError> {
    if reference.as_u32() == 0 {
        return Err(ReportError::InvalidRecord(
            "component reference must be positive, got 0".to_owned(),
        ));
    }
    Ok(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ReportReader;
    use camino::Utf8PathBuf;
    use rayon::prelude::*;
    use tempfile::TempDir;

    fn report_dir(temp: &TempDir) -> Utf8PathBuf {
        Utf8Path::from_path(temp.path())
            .expect("Invalid path")
            .join("report")
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_writer_is_send_sync() {
        assert_send_sync::<ReportWriter>();
    }

    #[test]
    fn test_open_creates_missing_parents() {
        let temp = TempDir::new().expect("temp dir");
        let dir = report_dir(&temp).join("nested").join("deeper");

        let writer = ReportWriter::open(&dir).expect("open");
        assert!(dir.is_dir());
        assert_eq!(writer.layout().dir(), dir.as_path());
    }

    #[test]
    fn test_open_existing_directory() {
        let temp = TempDir::new().expect("temp dir");
        let dir = Utf8Path::from_path(temp.path()).expect("Invalid path");
        assert!(ReportWriter::open(dir).is_ok());
    }

    #[test]
    fn test_open_rejects_file() {
        let temp = TempDir::new().expect("temp dir");
        let path = report_dir(&temp);
        std::fs::write(&path, b"not a directory").expect("write");

        let err = ReportWriter::open(&path).expect_err("file is not a directory");
        assert!(matches!(err, ReportError::NotADirectory(_)));
        assert!(err.is_io());
    }

    #[test]
    fn test_empty_issue_lists_create_no_file() {
        let temp = TempDir::new().expect("temp dir");
        let writer = ReportWriter::open(report_dir(&temp)).expect("open");
        let r = ComponentRef::new(1);

        writer.write_component_issues(r, Vec::new()).expect("write");
        writer
            .write_deleted_component_issues(r, "compUuid", Vec::new())
            .expect("write");

        assert!(!writer.layout().path(RecordKey::ComponentIssues(r)).exists());
        assert!(!writer.layout().path(RecordKey::DeletedComponentIssues(r)).exists());
        assert_eq!(writer.stats().skipped_empty, 2);
        assert_eq!(writer.stats().records(), 0);
    }

    #[test]
    fn test_component_without_reference_is_rejected() {
        let temp = TempDir::new().expect("temp dir");
        let writer = ReportWriter::open(report_dir(&temp)).expect("open");

        let err = writer
            .write_component(&Component::default())
            .expect_err("no reference");
        assert!(matches!(err, ReportError::InvalidRecord(_)));
    }

    #[test]
    fn test_zero_reference_is_rejected() {
        let temp = TempDir::new().expect("temp dir");
        let writer = ReportWriter::open(report_dir(&temp)).expect("open");
        let zero = ComponentRef::new(0);

        assert!(matches!(
            writer.write_component(&Component::new(zero, "UUID_0")),
            Err(ReportError::InvalidRecord(_))
        ));
        assert!(matches!(
            writer.write_component_issues(zero, vec![Issue::new("A")]),
            Err(ReportError::InvalidRecord(_))
        ));
        assert!(matches!(
            writer.write_deleted_component_issues(zero, "compUuid", Vec::new()),
            Err(ReportError::InvalidRecord(_))
        ));
        assert_eq!(writer.stats().records(), 0);
        assert!(!writer.layout().path(RecordKey::Component(zero)).exists());
    }

    #[test]
    fn test_duplicate_component_rejected_by_default() {
        let temp = TempDir::new().expect("temp dir");
        let writer = ReportWriter::open(report_dir(&temp)).expect("open");
        let r = ComponentRef::new(1);

        writer
            .write_component(&Component::new(r, "FIRST"))
            .expect("first write");
        let err = writer
            .write_component(&Component::new(r, "SECOND"))
            .expect_err("duplicate");
        assert_eq!(err.key(), Some(RecordKey::Component(r)));

        let reader = ReportReader::open(writer.layout().dir()).expect("open reader");
        assert_eq!(reader.read_component(r).expect("read").uuid(), "FIRST");
    }

    #[test]
    fn test_duplicate_issues_rejected_per_key_space() {
        let temp = TempDir::new().expect("temp dir");
        let writer = ReportWriter::open(report_dir(&temp)).expect("open");
        let r = ComponentRef::new(7);

        writer
            .write_component_issues(r, vec![Issue::new("A")])
            .expect("live issues");
        // Same ref in the deleted key space is a different record.
        writer
            .write_deleted_component_issues(r, "compUuid", vec![Issue::new("B")])
            .expect("deleted issues");

        assert!(matches!(
            writer.write_component_issues(r, vec![Issue::new("C")]),
            Err(ReportError::DuplicateRecord(_))
        ));
        assert!(matches!(
            writer.write_deleted_component_issues(r, "compUuid", vec![Issue::new("D")]),
            Err(ReportError::DuplicateRecord(_))
        ));
    }

    #[test]
    fn test_overwrite_policy_last_write_wins() {
        let temp = TempDir::new().expect("temp dir");
        let config = WriterConfig {
            duplicate_refs: DuplicateRefPolicy::Overwrite,
            ..WriterConfig::default()
        };
        let writer = ReportWriter::open_with_config(report_dir(&temp), config).expect("open");
        let r = ComponentRef::new(1);

        writer
            .write_component(&Component::new(r, "FIRST"))
            .expect("first write");
        writer
            .write_component(&Component::new(r, "SECOND"))
            .expect("second write");

        let reader = ReportReader::open(writer.layout().dir()).expect("open reader");
        assert_eq!(reader.read_component(r).expect("read").uuid(), "SECOND");
        assert_eq!(writer.stats().components, 2);
    }

    #[test]
    fn test_empty_rewrite_rejected_by_default() {
        let temp = TempDir::new().expect("temp dir");
        let writer = ReportWriter::open(report_dir(&temp)).expect("open");
        let r = ComponentRef::new(1);

        writer
            .write_component_issues(r, vec![Issue::new("A")])
            .expect("first write");
        let err = writer
            .write_component_issues(r, Vec::new())
            .expect_err("empty rewrite is still a duplicate");
        assert_eq!(err.key(), Some(RecordKey::ComponentIssues(r)));

        writer
            .write_deleted_component_issues(r, "compUuid", Vec::new())
            .expect("first empty write claims the key");
        assert!(matches!(
            writer.write_deleted_component_issues(r, "compUuid", vec![Issue::new("B")]),
            Err(ReportError::DuplicateRecord(_))
        ));

        let reader = ReportReader::open(writer.layout().dir()).expect("open reader");
        assert_eq!(reader.read_component_issues(r).expect("read").len(), 1);
    }

    #[test]
    fn test_empty_rewrite_overwrites_earlier_list() {
        let temp = TempDir::new().expect("temp dir");
        let config = WriterConfig {
            duplicate_refs: DuplicateRefPolicy::Overwrite,
            ..WriterConfig::default()
        };
        let writer = ReportWriter::open_with_config(report_dir(&temp), config).expect("open");
        let r = ComponentRef::new(1);

        writer
            .write_component_issues(r, vec![Issue::new("A")])
            .expect("first write");
        writer
            .write_component_issues(r, Vec::new())
            .expect("empty rewrite");
        writer
            .write_deleted_component_issues(r, "compUuid", vec![Issue::new("B")])
            .expect("deleted write");
        writer
            .write_deleted_component_issues(r, "compUuid", Vec::new())
            .expect("empty deleted rewrite");

        let key = RecordKey::ComponentIssues(r);
        assert!(!writer.layout().path(key).exists());
        assert!(!writer.layout().path(RecordKey::DeletedComponentIssues(r)).exists());

        let reader = ReportReader::open(writer.layout().dir()).expect("open reader");
        assert!(reader.read_component_issues(r).expect("read").is_empty());
        assert!(reader.deleted_component_refs().expect("list").is_empty());
    }

    #[test]
    fn test_metadata_can_be_rewritten() {
        let temp = TempDir::new().expect("temp dir");
        let writer = ReportWriter::open(report_dir(&temp)).expect("open");

        for date in [1, 2] {
            let metadata = Metadata {
                analysis_date: Some(date),
                ..Metadata::default()
            };
            writer.write_metadata(&metadata).expect("write metadata");
        }

        let reader = ReportReader::open(writer.layout().dir()).expect("open reader");
        assert_eq!(reader.read_metadata().expect("read").analysis_date(), 2);
    }

    #[test]
    fn test_failed_write_releases_claim() {
        let temp = TempDir::new().expect("temp dir");
        let dir = report_dir(&temp);
        let writer = ReportWriter::open(&dir).expect("open");
        let component = Component::new(ComponentRef::new(3), "UUID_C");

        std::fs::remove_dir(&dir).expect("remove report dir");
        let err = writer.write_component(&component).expect_err("directory is gone");
        assert!(err.is_io());

        std::fs::create_dir(&dir).expect("recreate report dir");
        writer.write_component(&component).expect("retry succeeds");
    }

    #[test]
    fn test_sync_on_write() {
        let temp = TempDir::new().expect("temp dir");
        let config = WriterConfig {
            sync_on_write: true,
            ..WriterConfig::default()
        };
        let writer = ReportWriter::open_with_config(report_dir(&temp), config).expect("open");
        writer.write_metadata(&Metadata::default()).expect("write");
        assert_eq!(writer.finish().metadata, 1);
    }

    #[test]
    fn test_parallel_workers_with_disjoint_refs() {
        let temp = TempDir::new().expect("temp dir");
        let writer = ReportWriter::open(report_dir(&temp)).expect("open");

        (1..=200u32)
            .into_par_iter()
            .try_for_each(|r| {
                let reference = ComponentRef::new(r);
                writer.write_component(&Component::new(reference, format!("UUID_{r}")))?;
                let issues = (0..r % 3)
                    .map(|i| Issue::new(format!("ISSUE_{r}_{i}")).with_line(i + 1))
                    .collect();
                writer.write_component_issues(reference, issues)
            })
            .expect("parallel writes");

        let stats = writer.stats();
        assert_eq!(stats.components, 200);
        // r % 3 == 0 for 66 refs in 1..=200.
        assert_eq!(stats.skipped_empty, 66);
        assert_eq!(stats.issue_lists, 134);

        let reader = ReportReader::open(writer.layout().dir()).expect("open reader");
        for r in 1..=200u32 {
            let reference = ComponentRef::new(r);
            let component = reader.read_component(reference).expect("component");
            assert_eq!(component.uuid(), format!("UUID_{r}"));
            let issues = reader.read_component_issues(reference).expect("issues");
            assert_eq!(issues.len() as u32, r % 3);
        }
    }
}
