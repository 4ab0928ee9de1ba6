//! Catalog domain model and output views.
//!
//! # Responsibility
//! - Define the read-only records loaded from the store.
//! - Define the serializable shapes handed to the request layer.
//!
//! # Invariants
//! - Identifiers are opaque integers unique within their entity type.
//! - Activities form a forest through `parent_id`; children are derived.

pub mod catalog;
pub mod view;
