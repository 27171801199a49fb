//! Core types for batch analysis reports.
//!
//! This crate provides the foundational types shared by the report writer
//! (scanner side) and the report reader (server side):
//!
//! - The record schema ([`Metadata`], [`Component`], [`Issue`], [`Issues`])
//! - Record identifiers ([`ComponentRef`], [`RecordKey`], [`RecordKind`])
//! - Configuration structures ([`StoreConfig`], [`WriterConfig`], [`ReaderConfig`])
//! - Type aliases for `FxHashMap`/`FxHashSet` (faster than std)

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod schema;
pub mod types;

pub use config::{DuplicateRefPolicy, ReaderConfig, StoreConfig, WriterConfig};
pub use error::ConfigError;
pub use hash::{FxHashMap, FxHashSet, fx_hash_map, fx_hash_set};
pub use schema::{Component, ComponentType, Issue, Issues, Metadata, Severity};
pub use types::{ComponentRef, RecordKey, RecordKind};
