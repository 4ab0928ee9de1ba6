//! Geographic filtering of buildings.
//!
//! # Responsibility
//! - Select buildings within a great-circle radius or a lat/lon rectangle.
//! - Turn raw request parameters into exactly one geo query shape.
//!
//! # Invariants
//! - Filters are pure functions over a full building snapshot (no spatial index).
//! - All boundaries are inclusive.

pub mod filter;
pub mod query;
