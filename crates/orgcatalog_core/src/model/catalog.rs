//! Store records for buildings, activities and organizations.
//!
//! # Invariants
//! - Building coordinates are finite.
//! - An organization belongs to exactly one building.
//! - Activity assignment is direct; ancestor membership is never stored.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BuildingId = i64;
pub type ActivityId = i64;
pub type OrganizationId = i64;
pub type PhoneId = i64;

/// Validation failures for records read from the store.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelValidationError {
    /// Latitude or longitude is NaN or infinite.
    NonFiniteCoordinate {
        building_id: BuildingId,
        latitude: f64,
        longitude: f64,
    },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteCoordinate {
                building_id,
                latitude,
                longitude,
            } => write!(
                f,
                "building {building_id} has non-finite coordinates ({latitude}, {longitude})"
            ),
        }
    }
}

impl Error for ModelValidationError {}

/// Physical location hosting organizations.
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub id: BuildingId,
    pub address: String,
    /// Degrees.
    pub latitude: f64,
    /// Degrees.
    pub longitude: f64,
}

impl Building {
    /// Checks that both coordinates are finite numbers.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.latitude.is_finite() && self.longitude.is_finite() {
            return Ok(());
        }
        Err(ModelValidationError::NonFiniteCoordinate {
            building_id: self.id,
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}

/// One category in the activity taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub id: ActivityId,
    pub name: String,
    /// `None` marks a root category.
    pub parent_id: Option<ActivityId>,
}

impl Activity {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub building_id: BuildingId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationPhone {
    pub id: PhoneId,
    pub organization_id: OrganizationId,
    pub phone_number: String,
}

/// Organization with its associations resolved by the store.
///
/// `activities` holds only the direct assignments, in assignment order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizationRecord {
    pub organization: Organization,
    pub building: Building,
    pub phones: Vec<OrganizationPhone>,
    pub activities: Vec<Activity>,
}
