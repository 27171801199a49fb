//! Component tree traversal over a report directory.
//!
//! [`ReportTree::load`] walks the tree from the root ref declared in the
//! metadata, reading each component and its issues once. Problems found on
//! the way (unresolvable refs, cycles, inconsistent parent links) are
//! collected rather than aborting the walk, so `validate` can report all of
//! them at once. Only a missing or unreadable metadata record is fatal.

use br_core::{
    Component, ComponentRef, ComponentType, FxHashMap, Issue, Issues, Metadata, Severity,
    fx_hash_map, fx_hash_set,
};
use br_store::{ReportError, ReportReader};
use serde::Serialize;
use tracing::debug;

/// One component reached by the walk, with its issues.
#[derive(Debug, Serialize)]
pub struct ComponentEntry {
    /// Distance from the root component.
    pub depth: usize,
    /// The component record.
    pub component: Component,
    /// The component's issues, empty if it has none.
    pub issues: Vec<Issue>,
}

/// A consistency problem found while walking a report.
#[derive(Debug, thiserror::Error)]
pub enum Problem {
    /// The metadata does not name a root component.
    #[error("metadata declares no root component")]
    MissingRoot,

    /// A reachable component or its issues could not be read.
    #[error("component {reference}: {source}")]
    Unreadable {
        /// The ref being read.
        reference: ComponentRef,
        /// Why the read failed.
        #[source]
        source: ReportError,
    },

    /// A component lists one of its own ancestors as a child.
    #[error("cycle: component {parent} lists ancestor {reference} as a child")]
    Cycle {
        /// The ancestor that was reached again.
        reference: ComponentRef,
        /// The component holding the back edge.
        parent: ComponentRef,
    },

    /// A component is listed as the child of more than one component.
    #[error("component {reference} is listed again as a child of {parent}")]
    SharedChild {
        /// The component reached twice.
        reference: ComponentRef,
        /// The second parent.
        parent: ComponentRef,
    },

    /// A component record carries a reference other than the one it is stored under.
    #[error("component {reference} record carries reference {found:?}")]
    RefMismatch {
        /// The ref the record is stored under.
        reference: ComponentRef,
        /// The ref inside the record.
        found: Option<u32>,
    },

    /// A component's parent ref disagrees with the tree.
    #[error("component {reference} declares parent #{declared} but is a child of {parent}")]
    ParentMismatch {
        /// The child component.
        reference: ComponentRef,
        /// The parent ref inside the record.
        declared: u32,
        /// The component that lists it as a child.
        parent: ComponentRef,
    },

    /// A deleted-component issues record could not be read.
    #[error("deleted component {reference}: {source}")]
    UnreadableDeleted {
        /// The deleted ref.
        reference: ComponentRef,
        /// Why the read failed.
        #[source]
        source: ReportError,
    },

    /// The number of deleted-component records disagrees with the metadata.
    #[error("metadata declares {declared} deleted components, report holds {found}")]
    DeletedCountMismatch {
        /// Count from the metadata record.
        declared: u32,
        /// Deleted-component issues records present.
        found: usize,
    },
}

/// A fully walked report.
#[derive(Debug)]
pub struct ReportTree {
    /// The metadata record.
    pub metadata: Metadata,
    /// Reachable components in depth-first preorder, children in listed order.
    pub components: Vec<ComponentEntry>,
    /// Deleted-component issues envelopes, sorted by ref.
    pub deleted: Vec<Issues>,
    /// Problems found during the walk.
    pub problems: Vec<Problem>,
}

impl ReportTree {
    /// Reads the metadata, walks the component tree and loads deleted issues.
    ///
    /// # Errors
    ///
    /// Fails only if the metadata cannot be read or the directory cannot be
    /// listed; everything else is recorded in [`problems`](Self::problems).
    pub fn load(reader: &ReportReader) -> Result<Self, ReportError> {
        let metadata = reader.read_metadata()?;
        let mut problems = Vec::new();

        let components = match metadata.root_ref() {
            Some(root) => walk(reader, root, &mut problems),
            None => {
                problems.push(Problem::MissingRoot);
                Vec::new()
            }
        };

        let deleted_refs = reader.deleted_component_refs()?;
        if deleted_refs.len() != metadata.deleted_components_count() as usize {
            problems.push(Problem::DeletedCountMismatch {
                declared: metadata.deleted_components_count(),
                found: deleted_refs.len(),
            });
        }

        let mut deleted = Vec::with_capacity(deleted_refs.len());
        for reference in deleted_refs {
            match reader.read_deleted_component_issues(reference) {
                Ok(issues) => deleted.push(issues),
                Err(source) => problems.push(Problem::UnreadableDeleted { reference, source }),
            }
        }

        debug!(
            components = components.len(),
            deleted = deleted.len(),
            problems = problems.len(),
            "Walked report"
        );

        Ok(Self {
            metadata,
            components,
            deleted,
            problems,
        })
    }

    /// Returns `true` if the walk found no problems.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }

    /// Total issues across live components.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.components.iter().map(|entry| entry.issues.len()).sum()
    }

    /// Total issues across deleted components.
    #[must_use]
    pub fn deleted_issue_count(&self) -> usize {
        self.deleted.iter().map(|issues| issues.issues.len()).sum()
    }

    /// Counts reachable components per type.
    #[must_use]
    pub fn type_histogram(&self) -> FxHashMap<ComponentType, usize> {
        let mut histogram = fx_hash_map();
        for entry in &self.components {
            *histogram.entry(entry.component.component_type()).or_insert(0) += 1;
        }
        histogram
    }

    /// Counts live-component issues per severity.
    #[must_use]
    pub fn severity_histogram(&self) -> FxHashMap<Severity, usize> {
        let mut histogram = fx_hash_map();
        for issue in self.components.iter().flat_map(|entry| &entry.issues) {
            *histogram.entry(issue.severity()).or_insert(0) += 1;
        }
        histogram
    }
}

/// Iterative depth-first walk from `root`.
fn walk(reader: &ReportReader, root: ComponentRef, problems: &mut Vec<Problem>) -> Vec<ComponentEntry> {
    let mut entries = Vec::new();
    let mut visited = fx_hash_set();
    // First parent each component was reached from; never contains a cycle.
    let mut parents: FxHashMap<ComponentRef, ComponentRef> = fx_hash_map();
    let mut stack: Vec<(ComponentRef, Option<ComponentRef>, usize)> = vec![(root, None, 0)];

    while let Some((reference, parent, depth)) = stack.pop() {
        if !visited.insert(reference) {
            if let Some(parent) = parent {
                problems.push(if is_ancestor(&parents, reference, parent) {
                    Problem::Cycle { reference, parent }
                } else {
                    Problem::SharedChild { reference, parent }
                });
            }
            continue;
        }
        if let Some(parent) = parent {
            parents.insert(reference, parent);
        }

        let component = match reader.read_component(reference) {
            Ok(component) => component,
            Err(source) => {
                problems.push(Problem::Unreadable { reference, source });
                continue;
            }
        };

        if component.component_ref() != Some(reference) {
            problems.push(Problem::RefMismatch {
                reference,
                found: component.reference,
            });
        }
        if let (Some(parent), Some(declared)) = (parent, component.parent_ref) {
            if declared != parent.as_u32() {
                problems.push(Problem::ParentMismatch {
                    reference,
                    declared,
                    parent,
                });
            }
        }

        let issues = reader.read_component_issues(reference).unwrap_or_else(|source| {
            problems.push(Problem::Unreadable { reference, source });
            Vec::new()
        });

        stack.extend(
            component
                .child_refs
                .iter()
                .rev()
                .map(|&child| (ComponentRef::new(child), Some(reference), depth + 1)),
        );
        entries.push(ComponentEntry {
            depth,
            component,
            issues,
        });
    }

    entries
}

/// Returns `true` if `target` is `from` or one of its recorded ancestors.
fn is_ancestor(
    parents: &FxHashMap<ComponentRef, ComponentRef>,
    target: ComponentRef,
    from: ComponentRef,
) -> bool {
    let mut current = from;
    loop {
        if current == target {
            return true;
        }
        match parents.get(&current) {
            Some(&parent) => current = parent,
            None => return false,
        }
    }
}
