//! Fast hash map and hash set type aliases.
//!
//! Report keys are small integers and short strings, and none of the maps are
//! exposed to untrusted input, so the Fx hash from `rustc-hash` is used instead
//! of the standard library's DoS-resistant SipHash.
//!
//! # Examples
//!
//! ```
//! use br_core::{ComponentRef, FxHashSet, fx_hash_set};
//!
//! let mut seen: FxHashSet<ComponentRef> = fx_hash_set();
//! assert!(seen.insert(ComponentRef::new(1)));
//! assert!(!seen.insert(ComponentRef::new(1)));
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// Creates a new empty [`FxHashMap`].
#[inline]
#[must_use]
pub fn fx_hash_map<K, V>() -> FxHashMap<K, V> {
    FxHashMap::default()
}

/// Creates a new empty [`FxHashSet`].
#[inline]
#[must_use]
pub fn fx_hash_set<V>() -> FxHashSet<V> {
    FxHashSet::default()
}
