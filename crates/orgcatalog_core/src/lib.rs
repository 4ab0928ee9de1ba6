//! Core query layer for the organization catalog.
//!
//! Organizations live in buildings and carry activity tags from a
//! hierarchical taxonomy. This crate answers lookups by building, activity,
//! activity subtree, name, geographic area and id over a read-only store.

pub mod auth;
pub mod config;
pub mod db;
pub mod geo;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod taxonomy;

pub use auth::{ApiKeyVerifier, AuthError, CredentialVerifier};
pub use config::{AppConfig, ConfigError};
pub use geo::filter::{filter_by_radius, filter_by_rectangle, haversine_km};
pub use geo::query::{GeoInputError, GeoParams, GeoQuery};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::catalog::{
    Activity, ActivityId, Building, BuildingId, Organization, OrganizationId, OrganizationPhone,
    OrganizationRecord,
};
pub use model::view::{ActivityNode, BuildingView, OrganizationView, PhoneView};
pub use repo::catalog_repo::{
    OrganizationFilter, OrganizationStore, RepoError, RepoResult, SqliteOrganizationStore,
};
pub use service::organization_query::{OrganizationQueryService, QueryError, QueryResult};
pub use taxonomy::{descendants, ChildIndex, ChildLookup};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
