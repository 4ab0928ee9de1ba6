//! Store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Define the read-only data access contract used by the query service.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Organizations are returned with building, phones and direct activities
//!   already resolved.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod catalog_repo;
