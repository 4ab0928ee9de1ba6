//! Output shapes returned by the query service.
//!
//! `ActivityNode::children` distinguishes "not provided" (`None`, rendered as
//! `null`) from "no children" (`Some(vec![])`). Consumers rely on that
//! difference to detect the depth cut-off.

use super::catalog::{
    ActivityId, Building, BuildingId, OrganizationId, OrganizationPhone, PhoneId,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingView {
    pub id: BuildingId,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Building> for BuildingView {
    fn from(value: Building) -> Self {
        Self {
            id: value.id,
            address: value.address,
            latitude: value.latitude,
            longitude: value.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneView {
    pub id: PhoneId,
    pub phone_number: String,
}

impl From<OrganizationPhone> for PhoneView {
    fn from(value: OrganizationPhone) -> Self {
        Self {
            id: value.id,
            phone_number: value.phone_number,
        }
    }
}

/// Depth-bounded rendering of one activity and its descendants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityNode {
    pub id: ActivityId,
    pub name: String,
    pub parent_id: Option<ActivityId>,
    /// `None` at the deepest rendered level.
    pub children: Option<Vec<ActivityNode>>,
}

/// Organization as handed to the request layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationView {
    pub id: OrganizationId,
    pub name: String,
    pub building: BuildingView,
    pub phones: Vec<PhoneView>,
    /// One tree per directly-assigned activity.
    pub activities: Vec<ActivityNode>,
}
