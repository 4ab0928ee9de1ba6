//! Catalog store contract and SQLite implementation.
//!
//! # Invariants
//! - Organizations come back ordered by id; phones by id; direct activities
//!   in assignment order.
//! - Case-insensitive matching uses Unicode lowercasing, not SQLite `lower()`.
//! - Id lists are bound in chunks of at most `MAX_BOUND_IDS` parameters.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::catalog::{
    Activity, ActivityId, Building, BuildingId, ModelValidationError, Organization,
    OrganizationId, OrganizationPhone, OrganizationRecord,
};
use log::warn;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const ORGANIZATION_SELECT_SQL: &str = "SELECT id, name, building_id FROM organizations";
const BUILDING_SELECT_SQL: &str = "SELECT id, address, latitude, longitude FROM buildings";
const ACTIVITY_SELECT_SQL: &str = "SELECT id, name, parent_id FROM activities";
// Stays well under SQLITE_MAX_VARIABLE_NUMBER (32766 in bundled builds).
const MAX_BOUND_IDS: usize = 500;

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("buildings", &["id", "address", "latitude", "longitude"]),
    ("activities", &["id", "name", "parent_id"]),
    ("organizations", &["id", "name", "building_id"]),
    ("organization_phones", &["id", "organization_id", "phone_number"]),
    ("organization_activities", &["id", "organization_id", "activity_id"]),
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from catalog store reads.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// A persisted record failed model validation.
    Validation(ModelValidationError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "catalog store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "catalog store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "catalog store requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid catalog data: {message}"),
        }
    }
}

// Wrapping variants are transparent: they display the inner error and
// forward its source, so a rendered chain never repeats a message.
impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => err.source(),
            Self::Validation(err) => err.source(),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Selection applied by [`OrganizationStore::fetch_organizations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizationFilter {
    /// Organizations located in any of these buildings.
    BuildingIds(Vec<BuildingId>),
    Building(BuildingId),
    /// Organizations directly tagged with any of these activities.
    ActivityIds(Vec<ActivityId>),
    /// Case-insensitive substring of the organization name.
    NameContains(String),
    Id(OrganizationId),
}

impl OrganizationFilter {
    /// Short label used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BuildingIds(_) => "building_ids",
            Self::Building(_) => "building",
            Self::ActivityIds(_) => "activity_ids",
            Self::NameContains(_) => "name_contains",
            Self::Id(_) => "id",
        }
    }
}

/// Read-only catalog store used by the query service.
pub trait OrganizationStore {
    /// Full activity snapshot ordered by id.
    fn fetch_activities(&self) -> RepoResult<Vec<Activity>>;
    /// Full building snapshot ordered by id.
    fn fetch_buildings(&self) -> RepoResult<Vec<Building>>;
    /// Organizations matching `filter`, associations resolved.
    fn fetch_organizations(
        &self,
        filter: &OrganizationFilter,
    ) -> RepoResult<Vec<OrganizationRecord>>;
    /// Activity whose name equals `name` ignoring case.
    fn fetch_activity_by_exact_name(&self, name: &str) -> RepoResult<Option<Activity>>;
}

impl<S: OrganizationStore + ?Sized> OrganizationStore for &S {
    fn fetch_activities(&self) -> RepoResult<Vec<Activity>> {
        (**self).fetch_activities()
    }

    fn fetch_buildings(&self) -> RepoResult<Vec<Building>> {
        (**self).fetch_buildings()
    }

    fn fetch_organizations(
        &self,
        filter: &OrganizationFilter,
    ) -> RepoResult<Vec<OrganizationRecord>> {
        (**self).fetch_organizations(filter)
    }

    fn fetch_activity_by_exact_name(&self, name: &str) -> RepoResult<Option<Activity>> {
        (**self).fetch_activity_by_exact_name(name)
    }
}

/// SQLite-backed catalog store.
pub struct SqliteOrganizationStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOrganizationStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_catalog_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl OrganizationStore for SqliteOrganizationStore<'_> {
    fn fetch_activities(&self) -> RepoResult<Vec<Activity>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACTIVITY_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(parse_activity_row(row)?);
        }
        Ok(activities)
    }

    fn fetch_buildings(&self) -> RepoResult<Vec<Building>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BUILDING_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut buildings = Vec::new();
        while let Some(row) = rows.next()? {
            buildings.push(parse_building_row(row)?);
        }
        Ok(buildings)
    }

    fn fetch_organizations(
        &self,
        filter: &OrganizationFilter,
    ) -> RepoResult<Vec<OrganizationRecord>> {
        let organizations = match filter {
            OrganizationFilter::BuildingIds(ids) if ids.is_empty() => Vec::new(),
            OrganizationFilter::BuildingIds(ids) => select_organizations_chunked(ids, |chunk| {
                select_organizations(
                    self.conn,
                    &format!("WHERE building_id IN ({})", placeholders(chunk.len())),
                    chunk,
                )
            })?,
            OrganizationFilter::Building(id) => {
                select_organizations(self.conn, "WHERE building_id = ?", &[*id])?
            }
            OrganizationFilter::ActivityIds(ids) if ids.is_empty() => Vec::new(),
            OrganizationFilter::ActivityIds(ids) => select_organizations_chunked(ids, |chunk| {
                select_organizations(
                    self.conn,
                    &format!(
                        "WHERE id IN (
                            SELECT organization_id
                            FROM organization_activities
                            WHERE activity_id IN ({})
                        )",
                        placeholders(chunk.len())
                    ),
                    chunk,
                )
            })?,
            OrganizationFilter::NameContains(text) => {
                let needle = text.to_lowercase();
                select_organizations(self.conn, "", &[])?
                    .into_iter()
                    .filter(|organization| organization.name.to_lowercase().contains(&needle))
                    .collect()
            }
            OrganizationFilter::Id(id) => {
                select_organizations(self.conn, "WHERE id = ?", &[*id])?
            }
        };

        resolve_associations(self.conn, organizations)
    }

    fn fetch_activity_by_exact_name(&self, name: &str) -> RepoResult<Option<Activity>> {
        let target = name.to_lowercase();
        let mut matches = self
            .fetch_activities()?
            .into_iter()
            .filter(|activity| activity.name.to_lowercase() == target);

        let first = matches.next();
        if let Some(activity) = &first {
            let extra = matches.count();
            if extra > 0 {
                warn!(
                    "event=activity_name_ambiguous module=repo status=ok activity_id={} extra_matches={}",
                    activity.id, extra
                );
            }
        }
        Ok(first)
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn bind_ids(ids: &[i64]) -> impl rusqlite::Params + '_ {
    params_from_iter(ids.iter().copied().map(Value::Integer))
}

/// Runs `select` per id chunk and merges the results back into id order
/// without duplicates.
fn select_organizations_chunked(
    ids: &[i64],
    mut select: impl FnMut(&[i64]) -> RepoResult<Vec<Organization>>,
) -> RepoResult<Vec<Organization>> {
    let mut chunks = ids.chunks(MAX_BOUND_IDS);
    let Some(first) = chunks.next() else {
        return Ok(Vec::new());
    };
    let mut organizations = select(first)?;
    let mut merged = false;
    for chunk in chunks {
        organizations.extend(select(chunk)?);
        merged = true;
    }
    if merged {
        organizations.sort_unstable_by_key(|organization| organization.id);
        organizations.dedup_by_key(|organization| organization.id);
    }
    Ok(organizations)
}

fn select_organizations(
    conn: &Connection,
    where_clause: &str,
    bind: &[i64],
) -> RepoResult<Vec<Organization>> {
    let mut stmt = conn.prepare(&format!(
        "{ORGANIZATION_SELECT_SQL} {where_clause} ORDER BY id ASC;"
    ))?;
    let mut rows = stmt.query(bind_ids(bind))?;
    let mut organizations = Vec::new();
    while let Some(row) = rows.next()? {
        organizations.push(Organization {
            id: row.get("id")?,
            name: row.get("name")?,
            building_id: row.get("building_id")?,
        });
    }
    Ok(organizations)
}

fn resolve_associations(
    conn: &Connection,
    organizations: Vec<Organization>,
) -> RepoResult<Vec<OrganizationRecord>> {
    if organizations.is_empty() {
        return Ok(Vec::new());
    }

    let organization_ids = organizations
        .iter()
        .map(|organization| organization.id)
        .collect::<Vec<_>>();
    let mut building_ids = organizations
        .iter()
        .map(|organization| organization.building_id)
        .collect::<Vec<_>>();
    building_ids.sort_unstable();
    building_ids.dedup();

    let buildings = load_buildings_by_id(conn, &building_ids)?;
    let mut phones = load_phones(conn, &organization_ids)?;
    let mut activities = load_assigned_activities(conn, &organization_ids)?;

    organizations
        .into_iter()
        .map(|organization| -> RepoResult<OrganizationRecord> {
            let building = buildings
                .get(&organization.building_id)
                .cloned()
                .ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "organization {} references missing building {}",
                        organization.id, organization.building_id
                    ))
                })?;
            Ok(OrganizationRecord {
                phones: phones.remove(&organization.id).unwrap_or_default(),
                activities: activities.remove(&organization.id).unwrap_or_default(),
                building,
                organization,
            })
        })
        .collect()
}

fn load_buildings_by_id(
    conn: &Connection,
    ids: &[BuildingId],
) -> RepoResult<HashMap<BuildingId, Building>> {
    let mut buildings = HashMap::new();
    for chunk in ids.chunks(MAX_BOUND_IDS) {
        let mut stmt = conn.prepare(&format!(
            "{BUILDING_SELECT_SQL} WHERE id IN ({});",
            placeholders(chunk.len())
        ))?;
        let mut rows = stmt.query(bind_ids(chunk))?;
        while let Some(row) = rows.next()? {
            let building = parse_building_row(row)?;
            buildings.insert(building.id, building);
        }
    }
    Ok(buildings)
}

fn load_phones(
    conn: &Connection,
    organization_ids: &[OrganizationId],
) -> RepoResult<HashMap<OrganizationId, Vec<OrganizationPhone>>> {
    let mut phones: HashMap<OrganizationId, Vec<OrganizationPhone>> = HashMap::new();
    for chunk in organization_ids.chunks(MAX_BOUND_IDS) {
        let mut stmt = conn.prepare(&format!(
            "SELECT id, organization_id, phone_number
             FROM organization_phones
             WHERE organization_id IN ({})
             ORDER BY id ASC;",
            placeholders(chunk.len())
        ))?;
        let mut rows = stmt.query(bind_ids(chunk))?;
        while let Some(row) = rows.next()? {
            let phone = OrganizationPhone {
                id: row.get("id")?,
                organization_id: row.get("organization_id")?,
                phone_number: row.get("phone_number")?,
            };
            phones.entry(phone.organization_id).or_default().push(phone);
        }
    }
    Ok(phones)
}

fn load_assigned_activities(
    conn: &Connection,
    organization_ids: &[OrganizationId],
) -> RepoResult<HashMap<OrganizationId, Vec<Activity>>> {
    let mut assigned: HashMap<OrganizationId, Vec<Activity>> = HashMap::new();
    for chunk in organization_ids.chunks(MAX_BOUND_IDS) {
        let mut stmt = conn.prepare(&format!(
            "SELECT
                oa.organization_id AS organization_id,
                a.id AS id,
                a.name AS name,
                a.parent_id AS parent_id
             FROM organization_activities oa
             INNER JOIN activities a ON a.id = oa.activity_id
             WHERE oa.organization_id IN ({})
             ORDER BY oa.id ASC;",
            placeholders(chunk.len())
        ))?;
        let mut rows = stmt.query(bind_ids(chunk))?;
        while let Some(row) = rows.next()? {
            let organization_id: OrganizationId = row.get("organization_id")?;
            assigned
                .entry(organization_id)
                .or_default()
                .push(parse_activity_row(row)?);
        }
    }
    Ok(assigned)
}

fn parse_activity_row(row: &Row<'_>) -> RepoResult<Activity> {
    Ok(Activity {
        id: row.get("id")?,
        name: row.get("name")?,
        parent_id: row.get("parent_id")?,
    })
}

fn parse_building_row(row: &Row<'_>) -> RepoResult<Building> {
    let building = Building {
        id: row.get("id")?,
        address: row.get("address")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
    };
    building.validate()?;
    Ok(building)
}

fn ensure_catalog_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
