//! Query use-case services.
//!
//! # Responsibility
//! - Orchestrate store reads, geo filtering and closure computation into the
//!   six organization lookups.
//! - Keep the request layer decoupled from storage details.

pub mod organization_query;
