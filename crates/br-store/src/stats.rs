//! Writer statistics with atomic counters.
//!
//! [`WriteStats`] is updated by every writer call, possibly from several
//! worker threads at once, and [`WriteSnapshot`] is the point-in-time copy
//! handed back to callers.
//!
//! All counters use [`Relaxed`](std::sync::atomic::Ordering::Relaxed) ordering;
//! they are informational and order nothing else.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Atomic counters for one report writer.
#[derive(Debug, Default)]
pub struct WriteStats {
    metadata: AtomicU64,
    components: AtomicU64,
    issue_lists: AtomicU64,
    deleted_issue_lists: AtomicU64,
    issues: AtomicU64,
    skipped_empty: AtomicU64,
    bytes: AtomicU64,
}

impl WriteStats {
    /// Creates a new [`WriteStats`] with all counters at zero.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a metadata write of `bytes` bytes.
    #[inline]
    pub fn record_metadata(&self, bytes: u64) {
        self.metadata.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Records a component write of `bytes` bytes.
    #[inline]
    pub fn record_component(&self, bytes: u64) {
        self.components.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Records a live-component issues write holding `issues` issues.
    #[inline]
    pub fn record_issue_list(&self, issues: u64, bytes: u64) {
        self.issue_lists.fetch_add(1, Ordering::Relaxed);
        self.issues.fetch_add(issues, Ordering::Relaxed);
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Records a deleted-component issues write holding `issues` issues.
    #[inline]
    pub fn record_deleted_issue_list(&self, issues: u64, bytes: u64) {
        self.deleted_issue_lists.fetch_add(1, Ordering::Relaxed);
        self.issues.fetch_add(issues, Ordering::Relaxed);
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Records an issues write that produced no file because the list was empty.
    #[inline]
    pub fn record_skipped_empty(&self) {
        self.skipped_empty.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time snapshot of all counters.
    ///
    /// # Examples
    ///
    /// ```
    /// use br_store::WriteStats;
    ///
    /// let stats = WriteStats::new();
    /// stats.record_component(12);
    /// stats.record_issue_list(3, 40);
    ///
    /// let snap = stats.snapshot();
    /// assert_eq!(snap.records(), 2);
    /// assert_eq!(snap.issues, 3);
    /// assert_eq!(snap.bytes, 52);
    /// ```
    #[must_use]
    pub fn snapshot(&self) -> WriteSnapshot {
        WriteSnapshot {
            metadata: self.metadata.load(Ordering::Relaxed),
            components: self.components.load(Ordering::Relaxed),
            issue_lists: self.issue_lists.load(Ordering::Relaxed),
            deleted_issue_lists: self.deleted_issue_lists.load(Ordering::Relaxed),
            issues: self.issues.load(Ordering::Relaxed),
            skipped_empty: self.skipped_empty.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`WriteStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WriteSnapshot {
    /// Metadata records written (overwrites included).
    pub metadata: u64,
    /// Component records written.
    pub components: u64,
    /// Live-component issues records written.
    pub issue_lists: u64,
    /// Deleted-component issues records written.
    pub deleted_issue_lists: u64,
    /// Issues written across both issues key spaces.
    pub issues: u64,
    /// Issues writes skipped because the list was empty.
    pub skipped_empty: u64,
    /// Total bytes written.
    pub bytes: u64,
}

impl WriteSnapshot {
    /// Returns the number of record files written.
    #[inline]
    #[must_use]
    pub const fn records(&self) -> u64 {
        self.metadata + self.components + self.issue_lists + self.deleted_issue_lists
    }
}
