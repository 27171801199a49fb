//! Wire definitions for batch report records.
//!
//! Every record is a protobuf message declared with `prost` derives, so no
//! `.proto` compilation step is needed. Scalar fields are proto2-style
//! `optional`: an unset field stays `None` through a round trip and the
//! generated getter (for example [`Metadata::analysis_date`]) returns the
//! type default.
//!
//! # Compatibility rules
//!
//! - Field tags are append-only. A tag is never reused for a different field,
//!   even after the field is removed.
//! - Decoders skip tags they do not know, so a reader built against an older
//!   schema accepts records from a newer writer and vice versa.
//!
//! # Examples
//!
//! ```
//! use br_core::{Issue, Severity};
//!
//! let mut issue = Issue::new("ISSUE_A").with_line(50);
//! issue.set_severity(Severity::Major);
//!
//! assert_eq!(issue.uuid(), "ISSUE_A");
//! assert_eq!(issue.line(), 50);
//! assert!(!issue.is_file_level());
//! ```

use serde::{Deserialize, Serialize};

use crate::types::ComponentRef;

/// The kind of node a [`Component`] represents in the analyzed tree.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    prost::Enumeration,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum ComponentType {
    /// The analyzed project (tree root).
    Project = 0,
    /// A sub-module of a multi-module project.
    Module = 1,
    /// A directory.
    Directory = 2,
    /// A source or test file.
    File = 3,
}

impl ComponentType {
    /// Returns a lowercase label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Module => "module",
            Self::Directory => "directory",
            Self::File => "file",
        }
    }
}

/// Severity of an [`Issue`], ordered from least to most severe.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    prost::Enumeration,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum Severity {
    /// Informational finding.
    Info = 0,
    /// Minor finding.
    Minor = 1,
    /// Major finding.
    Major = 2,
    /// Critical finding.
    Critical = 3,
    /// Blocking finding.
    Blocker = 4,
}

impl Severity {
    /// Returns an uppercase label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Minor => "MINOR",
            Self::Major => "MAJOR",
            Self::Critical => "CRITICAL",
            Self::Blocker => "BLOCKER",
        }
    }
}

/// Singleton record describing one analysis run.
///
/// Written once per report, conventionally before any component record.
/// A report without metadata is unreadable.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    /// Analysis timestamp in milliseconds since the Unix epoch.
    #[prost(int64, optional, tag = "1")]
    pub analysis_date: Option<i64>,

    /// Key of the analyzed project.
    #[prost(string, optional, tag = "2")]
    pub project_key: Option<String>,

    /// Reference of the root component of the tree.
    #[prost(uint32, optional, tag = "3")]
    pub root_component_ref: Option<u32>,

    /// Number of components present in the previous analysis but gone now.
    ///
    /// Each of them has a deleted-component issues record in the report.
    #[prost(uint32, optional, tag = "4")]
    pub deleted_components_count: Option<u32>,

    /// Branch name, when the analysis targets a non-default branch.
    #[prost(string, optional, tag = "5")]
    pub branch: Option<String>,
}

impl Metadata {
    /// Returns the root component reference, if set.
    #[inline]
    #[must_use]
    pub fn root_ref(&self) -> Option<ComponentRef> {
        self.root_component_ref.map(ComponentRef::new)
    }
}

/// One node of the analyzed component tree.
///
/// Identified within a report by its [`reference`](Self::reference); the
/// [`uuid`](Self::uuid) is the identity that survives across analyses.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Component {
    /// Scanner-assigned reference, unique within the report.
    #[prost(uint32, optional, tag = "1")]
    pub reference: Option<u32>,

    /// Stable identity used to correlate components across analyses.
    #[prost(string, optional, tag = "2")]
    pub uuid: Option<String>,

    /// Node kind.
    #[prost(enumeration = "ComponentType", optional, tag = "3")]
    pub component_type: Option<i32>,

    /// Component key.
    #[prost(string, optional, tag = "4")]
    pub key: Option<String>,

    /// Display name.
    #[prost(string, optional, tag = "5")]
    pub name: Option<String>,

    /// Path relative to the parent module.
    #[prost(string, optional, tag = "6")]
    pub path: Option<String>,

    /// Language key for files.
    #[prost(string, optional, tag = "7")]
    pub language: Option<String>,

    /// Whether this file contains test code.
    #[prost(bool, optional, tag = "8")]
    pub is_test: Option<bool>,

    /// Reference of the parent node; unset for the root.
    #[prost(uint32, optional, tag = "9")]
    pub parent_ref: Option<u32>,

    /// Ordered references of the child nodes.
    #[prost(uint32, repeated, tag = "10")]
    pub child_refs: Vec<u32>,
}

impl Component {
    /// Creates a component with only its reference and UUID set.
    ///
    /// # Examples
    ///
    /// ```
    /// use br_core::{Component, ComponentRef};
    ///
    /// let component = Component::new(ComponentRef::new(1), "UUID_A");
    /// assert_eq!(component.component_ref(), Some(ComponentRef::new(1)));
    /// assert_eq!(component.uuid(), "UUID_A");
    /// ```
    #[must_use]
    pub fn new(reference: ComponentRef, uuid: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.as_u32()),
            uuid: Some(uuid.into()),
            ..Self::default()
        }
    }

    /// Returns the component reference, if set.
    #[inline]
    #[must_use]
    pub fn component_ref(&self) -> Option<ComponentRef> {
        self.reference.map(ComponentRef::new)
    }

    /// Iterates over the child references in order.
    pub fn children(&self) -> impl Iterator<Item = ComponentRef> + '_ {
        self.child_refs.iter().copied().map(ComponentRef::new)
    }
}

/// One analysis finding.
///
/// The owning component is implied by the issues record the finding is
/// stored in.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Issue {
    /// Stable identity of the issue.
    #[prost(string, optional, tag = "1")]
    pub uuid: Option<String>,

    /// 1-based line; unset or 0 marks a file-level issue.
    #[prost(uint32, optional, tag = "2")]
    pub line: Option<u32>,

    /// Human-readable message.
    #[prost(string, optional, tag = "3")]
    pub message: Option<String>,

    /// Severity.
    #[prost(enumeration = "Severity", optional, tag = "4")]
    pub severity: Option<i32>,

    /// Repository of the rule that raised the issue.
    #[prost(string, optional, tag = "5")]
    pub rule_repository: Option<String>,

    /// Key of the rule within its repository.
    #[prost(string, optional, tag = "6")]
    pub rule_key: Option<String>,

    /// Estimated remediation effort.
    #[prost(double, optional, tag = "7")]
    pub effort_to_fix: Option<f64>,
}

impl Issue {
    /// Creates an issue with only its UUID set.
    #[must_use]
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: Some(uuid.into()),
            ..Self::default()
        }
    }

    /// Sets the line and returns the issue.
    #[must_use]
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Returns `true` if the issue is not attached to a specific line.
    #[inline]
    #[must_use]
    pub fn is_file_level(&self) -> bool {
        self.line() == 0
    }
}

/// Envelope holding every issue of one component.
///
/// Live components are identified by `component_ref` alone. Deleted
/// components also carry `component_uuid`, since their reference no longer
/// resolves to a component record.
#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Issues {
    /// Reference of the owning component.
    #[prost(uint32, optional, tag = "1")]
    pub component_ref: Option<u32>,

    /// UUID of the owning component; set for deleted components.
    #[prost(string, optional, tag = "2")]
    pub component_uuid: Option<String>,

    /// The issues, in the order they were written.
    #[prost(message, repeated, tag = "3")]
    pub issues: Vec<Issue>,
}

impl Issues {
    /// Builds the envelope for a component present in the current tree.
    #[must_use]
    pub fn for_component(component_ref: ComponentRef, issues: Vec<Issue>) -> Self {
        Self {
            component_ref: Some(component_ref.as_u32()),
            component_uuid: None,
            issues,
        }
    }

    /// Builds the envelope for a component deleted since the previous analysis.
    #[must_use]
    pub fn for_deleted_component(
        component_ref: ComponentRef,
        component_uuid: impl Into<String>,
        issues: Vec<Issue>,
    ) -> Self {
        Self {
            component_ref: Some(component_ref.as_u32()),
            component_uuid: Some(component_uuid.into()),
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_unset_fields_use_defaults() {
        let metadata = Metadata::default();
        assert_eq!(metadata.analysis_date(), 0);
        assert_eq!(metadata.project_key(), "");
        assert!(metadata.root_ref().is_none());
    }

    #[test]
    fn test_enumeration_accessors() {
        let mut component = Component::new(ComponentRef::new(3), "UUID_C");
        assert_eq!(component.component_type(), ComponentType::Project);

        component.set_component_type(ComponentType::File);
        assert_eq!(component.component_type, Some(3));
        assert_eq!(component.component_type(), ComponentType::File);
    }

    #[test]
    fn test_unknown_fields_are_skipped() {
        // A newer writer appends field 15 (string) to a Metadata record.
        let metadata = Metadata {
            analysis_date: Some(15_000_000),
            ..Metadata::default()
        };
        let mut bytes = metadata.encode_to_vec();
        bytes.extend_from_slice(&[(15 << 3) | 2, 3, b'n', b'e', b'w']);

        let decoded = Metadata::decode(bytes.as_slice()).expect("decode");
        assert_eq!(decoded, metadata);
    }

    #[test]
    fn test_issue_file_level() {
        assert!(Issue::new("A").is_file_level());
        assert!(Issue::new("A").with_line(0).is_file_level());
        assert!(!Issue::new("A").with_line(1).is_file_level());
    }

    #[test]
    fn test_issues_envelopes() {
        let live = Issues::for_component(ComponentRef::new(4), vec![Issue::new("X")]);
        assert_eq!(live.component_ref, Some(4));
        assert!(live.component_uuid.is_none());

        let deleted = Issues::for_deleted_component(ComponentRef::new(5), "compUuid", Vec::new());
        assert_eq!(deleted.component_uuid(), "compUuid");
        assert!(deleted.issues.is_empty());
    }

    #[test]
    fn test_severity_ordering_and_labels() {
        assert!(Severity::Blocker > Severity::Info);
        assert_eq!(Severity::Critical.label(), "CRITICAL");
        assert_eq!(ComponentType::Directory.label(), "directory");
    }

    #[test]
    fn test_component_json() {
        let mut component = Component::new(ComponentRef::new(1), "UUID_A");
        component.child_refs = vec![2, 3];
        let json = serde_json::to_value(&component).expect("serialize");
        assert_eq!(json["reference"], 1);
        assert_eq!(json["child_refs"], serde_json::json!([2, 3]));
    }
}
