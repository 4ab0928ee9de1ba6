//! Activity taxonomy traversal.
//!
//! # Responsibility
//! - Derive child lists from parent pointers for one activity snapshot.
//! - Compute the descendant closure used by tree-expanded search.
//! - Render depth-bounded activity trees for output.
//!
//! # Invariants
//! - Closure traversal has no depth cap; rendering stops at `max_level`.
//! - Nothing here is cached across calls; every request brings its snapshot.

pub mod children;
pub mod closure;
pub mod render;

pub use children::{ChildIndex, ChildLookup};
pub use closure::descendants;
pub use render::{render_activity, render_assigned, DEFAULT_MAX_LEVEL, ROOT_LEVEL};
