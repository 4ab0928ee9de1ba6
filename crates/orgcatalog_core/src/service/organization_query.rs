//! Organization lookup service.
//!
//! # Responsibility
//! - Answer lookups by building, activity, activity subtree, name, geography
//!   and id.
//! - Map store records to `OrganizationView`, rendering each direct activity
//!   as a depth-bounded tree.
//!
//! # Invariants
//! - The service never writes and holds no state between calls.
//! - Geo input is validated before any store access.
//! - An empty building selection issues no organization read.

use crate::geo::query::{GeoInputError, GeoParams, GeoQuery};
use crate::model::catalog::{Activity, BuildingId, OrganizationId, OrganizationRecord};
use crate::model::view::OrganizationView;
use crate::repo::catalog_repo::{OrganizationFilter, OrganizationStore, RepoError};
use crate::taxonomy::{descendants, render_assigned, ChildIndex};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type QueryResult<T> = Result<T, QueryError>;

/// Errors surfaced by organization lookups.
#[derive(Debug)]
pub enum QueryError {
    /// No activity carries this name (case-insensitive).
    ActivityNotFound(String),
    OrganizationNotFound(OrganizationId),
    /// Request parameters cannot form a query.
    BadInput(GeoInputError),
    /// Store read failure, passed through unchanged.
    Store(RepoError),
}

impl QueryError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ActivityNotFound(_) | Self::OrganizationNotFound(_)
        )
    }

    pub fn is_bad_input(&self) -> bool {
        matches!(self, Self::BadInput(_))
    }
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ActivityNotFound(name) => write!(f, "activity not found: `{name}`"),
            Self::OrganizationNotFound(id) => write!(f, "organization not found: {id}"),
            Self::BadInput(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for QueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::BadInput(err) => err.source(),
            Self::Store(err) => err.source(),
            _ => None,
        }
    }
}

impl From<RepoError> for QueryError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

impl From<GeoInputError> for QueryError {
    fn from(value: GeoInputError) -> Self {
        Self::BadInput(value)
    }
}

/// Stateless lookup facade over an [`OrganizationStore`].
pub struct OrganizationQueryService<S: OrganizationStore> {
    store: S,
}

impl<S: OrganizationStore> OrganizationQueryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All organizations located in `building_id`.
    pub fn organizations_in_building(
        &self,
        building_id: BuildingId,
    ) -> QueryResult<Vec<OrganizationView>> {
        self.logged("by_building", || {
            self.fetch_views(&OrganizationFilter::Building(building_id), None)
        })
    }

    /// Organizations directly tagged with the named activity.
    ///
    /// Organizations tagged only with a descendant activity are not included.
    pub fn organizations_by_activity_name(
        &self,
        name: &str,
    ) -> QueryResult<Vec<OrganizationView>> {
        self.logged("by_activity", || {
            let activity = self.resolve_activity(name)?;
            self.fetch_views(&OrganizationFilter::ActivityIds(vec![activity.id]), None)
        })
    }

    /// Organizations tagged with the named activity or any of its descendants.
    pub fn organizations_by_activity_tree(
        &self,
        name: &str,
    ) -> QueryResult<Vec<OrganizationView>> {
        self.logged("by_activity_tree", || {
            let activity = self.resolve_activity(name)?;
            let snapshot = self.store.fetch_activities()?;
            let closure = descendants(activity.id, &snapshot);
            self.fetch_views(
                &OrganizationFilter::ActivityIds(closure.into_iter().collect()),
                Some(snapshot),
            )
        })
    }

    /// Organizations whose name contains `text`, ignoring case.
    pub fn organizations_by_name_substring(
        &self,
        text: &str,
    ) -> QueryResult<Vec<OrganizationView>> {
        self.logged("by_name", || {
            self.fetch_views(&OrganizationFilter::NameContains(text.to_string()), None)
        })
    }

    /// Organizations in buildings selected by radius or rectangle parameters.
    ///
    /// # Errors
    /// - `BadInput` unless exactly one complete shape is given; no store read
    ///   happens in that case.
    pub fn organizations_by_geo(&self, params: &GeoParams) -> QueryResult<Vec<OrganizationView>> {
        let query = GeoQuery::from_params(params).map_err(|err| {
            error!("event=org_query module=service status=error kind=by_geo error_code=bad_input error={err}");
            QueryError::from(err)
        })?;
        self.organizations_in_area(&query)
    }

    /// Organizations in buildings selected by an already-validated geo query.
    pub fn organizations_in_area(&self, query: &GeoQuery) -> QueryResult<Vec<OrganizationView>> {
        self.logged("by_geo", || {
            let buildings = self.store.fetch_buildings()?;
            let building_ids = query.select(&buildings);
            debug!(
                "event=geo_filter module=service status=ok shape={} scanned={} matched={}",
                query.kind(),
                buildings.len(),
                building_ids.len()
            );
            if building_ids.is_empty() {
                return Ok(Vec::new());
            }
            self.fetch_views(
                &OrganizationFilter::BuildingIds(building_ids.into_iter().collect()),
                None,
            )
        })
    }

    /// One organization by id.
    pub fn organization_by_id(&self, id: OrganizationId) -> QueryResult<OrganizationView> {
        self.logged("by_id", || {
            self.fetch_views(&OrganizationFilter::Id(id), None)?
                .pop()
                .ok_or(QueryError::OrganizationNotFound(id))
        })
    }

    fn resolve_activity(&self, name: &str) -> QueryResult<Activity> {
        self.store
            .fetch_activity_by_exact_name(name)?
            .ok_or_else(|| QueryError::ActivityNotFound(name.to_string()))
    }

    /// Loads matching organizations and renders them against one activity
    /// snapshot, reusing `snapshot` when the caller already read it.
    fn fetch_views(
        &self,
        filter: &OrganizationFilter,
        snapshot: Option<Vec<Activity>>,
    ) -> QueryResult<Vec<OrganizationView>> {
        let records = self.store.fetch_organizations(filter)?;
        debug!(
            "event=org_fetch module=service status=ok filter={} records={}",
            filter.kind(),
            records.len()
        );
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let activities = match snapshot {
            Some(activities) => activities,
            None => self.store.fetch_activities()?,
        };
        let index = ChildIndex::build(&activities);

        Ok(records
            .into_iter()
            .map(|record| to_view(record, &index))
            .collect())
    }

    fn logged<T: ResultCount>(
        &self,
        kind: &'static str,
        run: impl FnOnce() -> QueryResult<T>,
    ) -> QueryResult<T> {
        let started_at = Instant::now();
        let result = run();
        match &result {
            Ok(value) => info!(
                "event=org_query module=service status=ok kind={kind} count={} duration_ms={}",
                value.result_count(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=org_query module=service status=error kind={kind} not_found={} duration_ms={} error={err}",
                err.is_not_found(),
                started_at.elapsed().as_millis()
            ),
        }
        result
    }
}

trait ResultCount {
    fn result_count(&self) -> usize;
}

impl ResultCount for Vec<OrganizationView> {
    fn result_count(&self) -> usize {
        self.len()
    }
}

impl ResultCount for OrganizationView {
    fn result_count(&self) -> usize {
        1
    }
}

fn to_view(record: OrganizationRecord, index: &ChildIndex<'_>) -> OrganizationView {
    OrganizationView {
        id: record.organization.id,
        name: record.organization.name,
        activities: render_assigned(&record.activities, index),
        building: record.building.into(),
        phones: record.phones.into_iter().map(Into::into).collect(),
    }
}
