//! Identifier types for report records.
//!
//! - [`component_ref`] - The scanner-assigned component reference
//! - [`record`] - Record kinds and fully qualified record keys
//!
//! All public types are re-exported here and at the crate root:
//!
//! ```
//! use br_core::{ComponentRef, RecordKey, RecordKind};
//! ```

mod component_ref;
mod record;

pub use component_ref::ComponentRef;
pub use record::{RecordKey, RecordKind};
