//! Directory-backed storage for batch analysis reports.
//!
//! A scanner produces a report as a directory of small binary files, one per
//! record; the server later reads records back one at a time. This crate is
//! both sides of that exchange.
//!
//! # Overview
//!
//! - [`ReportWriter`]: Scanner side, one file per record, safe to share across
//!   worker threads
//! - [`ReportReader`]: Server side, lazy single-record reads with a
//!   required/optional presence contract
//! - [`ReportLayout`]: The single mapping between record keys and file names
//! - [`codec`]: Length-delimited prost framing shared by both sides
//! - [`WriteStats`]: Atomic counters reported by the writer
//!
//! # Example
//!
//! ```
//! use br_core::{Component, ComponentRef, Issue, Metadata};
//! use br_store::{ReportReader, ReportWriter};
//! use camino::Utf8Path;
//!
//! let temp = tempfile::tempdir().unwrap();
//! let dir = Utf8Path::from_path(temp.path()).unwrap();
//!
//! let writer = ReportWriter::open(dir).unwrap();
//! writer.write_metadata(&Metadata { root_component_ref: Some(1), ..Metadata::default() }).unwrap();
//! writer.write_component(&Component::new(ComponentRef::new(1), "UUID_A")).unwrap();
//! writer.write_deleted_component_issues(ComponentRef::new(7), "UUID_GONE", vec![Issue::new("I1")]).unwrap();
//! writer.finish();
//!
//! let reader = ReportReader::open(dir).unwrap();
//! let root = reader.read_metadata().unwrap().root_ref().unwrap();
//! assert_eq!(reader.read_component(root).unwrap().uuid(), "UUID_A");
//! assert!(reader.read_component_issues(root).unwrap().is_empty());
//! assert_eq!(reader.deleted_component_refs().unwrap(), vec![ComponentRef::new(7)]);
//! ```
//!
//! # Architecture
//!
//! ```text
//! ReportWriter ──┐                    ┌── ReportReader
//!   │            │                    │        │
//!   ├── claim    ├── ReportLayout ────┤        ├── size limit
//!   │  (Mutex +  │   (key <-> name)   │        │
//!   │   FxHashSet)                    │        └── presence policy
//!   │            └── codec ───────────┘
//!   └── WriteStats   (prost, length-delimited)
//!       (atomics)
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod codec;
mod error;
mod layout;
mod reader;
mod stats;
mod writer;

pub use codec::CodecError;
pub use error::ReportError;
pub use layout::ReportLayout;
pub use reader::ReportReader;
pub use stats::{WriteSnapshot, WriteStats};
pub use writer::ReportWriter;
