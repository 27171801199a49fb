//! Record kinds and keys.
//!
//! A report is a set of records addressed by [`RecordKey`]. The key's
//! [`RecordKind`] carries the presence policy the reader applies when the
//! record is absent.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ComponentRef;

/// The four record kinds stored in a report directory.
///
/// # Examples
///
/// ```
/// use br_core::RecordKind;
///
/// assert!(RecordKind::Metadata.is_required());
/// assert!(RecordKind::DeletedComponentIssues.is_required());
/// assert!(!RecordKind::ComponentIssues.is_required());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// The singleton metadata record.
    Metadata,
    /// One component record per tree node.
    Component,
    /// Issues of a component present in the tree.
    ComponentIssues,
    /// Issues of a component deleted since the previous analysis.
    DeletedComponentIssues,
}

impl RecordKind {
    /// All kinds, in layout order.
    pub const ALL: [Self; 4] = [
        Self::Metadata,
        Self::Component,
        Self::ComponentIssues,
        Self::DeletedComponentIssues,
    ];

    /// Returns `true` if a missing record of this kind is a structural error.
    ///
    /// Only live-component issues are optional: a component without findings
    /// has no issues record at all.
    #[inline]
    #[must_use]
    pub const fn is_required(self) -> bool {
        !matches!(self, Self::ComponentIssues)
    }

    /// Returns `true` if records of this kind are addressed by a reference.
    #[inline]
    #[must_use]
    pub const fn is_keyed(self) -> bool {
        !matches!(self, Self::Metadata)
    }

    /// Returns a short label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::Component => "component",
            Self::ComponentIssues => "component issues",
            Self::DeletedComponentIssues => "deleted component issues",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fully qualified address of one record in a report.
///
/// # Examples
///
/// ```
/// use br_core::{ComponentRef, RecordKey, RecordKind};
///
/// let key = RecordKey::DeletedComponentIssues(ComponentRef::new(2));
/// assert_eq!(key.kind(), RecordKind::DeletedComponentIssues);
/// assert_eq!(key.component_ref(), Some(ComponentRef::new(2)));
/// assert_eq!(key.to_string(), "issues of deleted component #2");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKey {
    /// The metadata record.
    Metadata,
    /// The component record for a reference.
    Component(ComponentRef),
    /// The issues record of a live component.
    ComponentIssues(ComponentRef),
    /// The issues record of a deleted component.
    DeletedComponentIssues(ComponentRef),
}

impl RecordKey {
    /// Builds a key from a kind and, for keyed kinds, a reference.
    ///
    /// Returns `None` when the reference is missing for a keyed kind or
    /// present for [`RecordKind::Metadata`].
    #[must_use]
    pub const fn from_parts(kind: RecordKind, reference: Option<ComponentRef>) -> Option<Self> {
        match (kind, reference) {
            (RecordKind::Metadata, None) => Some(Self::Metadata),
            (RecordKind::Component, Some(r)) => Some(Self::Component(r)),
            (RecordKind::ComponentIssues, Some(r)) => Some(Self::ComponentIssues(r)),
            (RecordKind::DeletedComponentIssues, Some(r)) => Some(Self::DeletedComponentIssues(r)),
            _ => None,
        }
    }

    /// Returns the record kind.
    #[inline]
    #[must_use]
    pub const fn kind(self) -> RecordKind {
        match self {
            Self::Metadata => RecordKind::Metadata,
            Self::Component(_) => RecordKind::Component,
            Self::ComponentIssues(_) => RecordKind::ComponentIssues,
            Self::DeletedComponentIssues(_) => RecordKind::DeletedComponentIssues,
        }
    }

    /// Returns the reference for keyed records.
    #[inline]
    #[must_use]
    pub const fn component_ref(self) -> Option<ComponentRef> {
        match self {
            Self::Metadata => None,
            Self::Component(r) | Self::ComponentIssues(r) | Self::DeletedComponentIssues(r) => {
                Some(r)
            }
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metadata => f.write_str("metadata"),
            Self::Component(r) => write!(f, "component {r}"),
            Self::ComponentIssues(r) => write!(f, "issues of component {r}"),
            Self::DeletedComponentIssues(r) => write!(f, "issues of deleted component {r}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_policy() {
        let required: Vec<_> = RecordKind::ALL
            .into_iter()
            .filter(|kind| kind.is_required())
            .collect();
        assert_eq!(
            required,
            vec![
                RecordKind::Metadata,
                RecordKind::Component,
                RecordKind::DeletedComponentIssues
            ]
        );
    }

    #[test]
    fn test_from_parts_round_trips_kind() {
        let r = ComponentRef::new(3);
        for kind in RecordKind::ALL {
            let reference = kind.is_keyed().then_some(r);
            let key = RecordKey::from_parts(kind, reference).expect("valid parts");
            assert_eq!(key.kind(), kind);
            assert_eq!(key.component_ref(), reference);
        }
    }

    #[test]
    fn test_from_parts_rejects_mismatch() {
        assert!(RecordKey::from_parts(RecordKind::Metadata, Some(ComponentRef::new(1))).is_none());
        assert!(RecordKey::from_parts(RecordKind::Component, None).is_none());
    }

    #[test]
    fn test_display() {
        let r = ComponentRef::new(1);
        let rendered = [
            RecordKey::Metadata,
            RecordKey::Component(r),
            RecordKey::ComponentIssues(r),
            RecordKey::DeletedComponentIssues(r),
        ]
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");

        insta::assert_snapshot!(rendered, @r"
        metadata
        component #1
        issues of component #1
        issues of deleted component #1
        ");
    }
}
