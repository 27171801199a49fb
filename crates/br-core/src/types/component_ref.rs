//! The component reference newtype.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A scanner-assigned reference identifying one node of the component tree.
///
/// References are dense positive integers, unique within one report. A
/// reference that belonged to a deleted component is only meaningful in the
/// deleted-issues key space.
///
/// # Examples
///
/// ```
/// use br_core::ComponentRef;
///
/// let r = ComponentRef::new(42);
/// assert_eq!(r.as_u32(), 42);
/// assert_eq!(r.to_string(), "#42");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ComponentRef(pub u32);

impl ComponentRef {
    /// Creates a new component reference.
    #[inline]
    #[must_use]
    pub const fn new(reference: u32) -> Self {
        Self(reference)
    }

    /// Returns the inner value.
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for ComponentRef {
    #[inline]
    fn from(reference: u32) -> Self {
        Self(reference)
    }
}

impl From<ComponentRef> for u32 {
    #[inline]
    fn from(reference: ComponentRef) -> Self {
        reference.0
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let r = ComponentRef::from(7);
        assert_eq!(u32::from(r), 7);
        assert_eq!(r, ComponentRef::new(7));
    }

    #[test]
    fn test_ordering() {
        let mut refs = vec![ComponentRef::new(10), ComponentRef::new(2), ComponentRef::new(5)];
        refs.sort();
        assert_eq!(refs, vec![ComponentRef(2), ComponentRef(5), ComponentRef(10)]);
    }

    #[test]
    fn test_serializes_as_plain_integer() {
        let json = serde_json::to_string(&ComponentRef::new(9)).expect("serialize");
        assert_eq!(json, "9");
    }
}
