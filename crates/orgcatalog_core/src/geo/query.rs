//! Geo query shapes built from optional request parameters.

use super::filter::{filter_by_radius, filter_by_rectangle};
use crate::model::catalog::{Building, BuildingId};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Raw geo parameters as received from the request layer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeoParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius_km: Option<f64>,
    pub lat_min: Option<f64>,
    pub lat_max: Option<f64>,
    pub lon_min: Option<f64>,
    pub lon_max: Option<f64>,
}

/// Rejected geo parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoInputError {
    /// Neither the radius triple nor the rectangle quadruple is complete.
    MissingShape,
    /// Both shapes are complete; the caller must pick one.
    AmbiguousShape,
    /// A provided parameter is NaN or infinite.
    NonFinite(&'static str),
    NegativeRadius(f64),
}

impl Display for GeoInputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingShape => write!(
                f,
                "provide either a radius (lat, lon, radius_km) or a rectangle (lat_min, lat_max, lon_min, lon_max)"
            ),
            Self::AmbiguousShape => write!(
                f,
                "radius and rectangle parameters cannot be combined in one query"
            ),
            Self::NonFinite(name) => write!(f, "geo parameter `{name}` must be a finite number"),
            Self::NegativeRadius(value) => {
                write!(f, "radius_km must not be negative, got {value}")
            }
        }
    }
}

impl Error for GeoInputError {}

/// Exactly one spatial predicate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeoQuery {
    Radius {
        lat: f64,
        lon: f64,
        radius_km: f64,
    },
    Rectangle {
        lat_min: f64,
        lat_max: f64,
        lon_min: f64,
        lon_max: f64,
    },
}

impl GeoQuery {
    /// Builds a query from optional parameters.
    ///
    /// # Errors
    /// - `MissingShape` when no shape is fully specified.
    /// - `AmbiguousShape` when both shapes are fully specified.
    /// - `NonFinite` / `NegativeRadius` for unusable values.
    pub fn from_params(params: &GeoParams) -> Result<Self, GeoInputError> {
        for (name, value) in [
            ("lat", params.lat),
            ("lon", params.lon),
            ("radius_km", params.radius_km),
            ("lat_min", params.lat_min),
            ("lat_max", params.lat_max),
            ("lon_min", params.lon_min),
            ("lon_max", params.lon_max),
        ] {
            if value.is_some_and(|value| !value.is_finite()) {
                return Err(GeoInputError::NonFinite(name));
            }
        }

        let radius = match (params.lat, params.lon, params.radius_km) {
            (Some(lat), Some(lon), Some(radius_km)) => Some(Self::Radius {
                lat,
                lon,
                radius_km,
            }),
            _ => None,
        };
        let rectangle = match (params.lat_min, params.lat_max, params.lon_min, params.lon_max) {
            (Some(lat_min), Some(lat_max), Some(lon_min), Some(lon_max)) => Some(Self::Rectangle {
                lat_min,
                lat_max,
                lon_min,
                lon_max,
            }),
            _ => None,
        };

        match (radius, rectangle) {
            (Some(_), Some(_)) => Err(GeoInputError::AmbiguousShape),
            (None, None) => Err(GeoInputError::MissingShape),
            (Some(Self::Radius { radius_km, .. }), None) if radius_km < 0.0 => {
                Err(GeoInputError::NegativeRadius(radius_km))
            }
            (Some(query), None) | (None, Some(query)) => Ok(query),
        }
    }

    /// Applies the predicate to a building snapshot.
    pub fn select(&self, buildings: &[Building]) -> BTreeSet<BuildingId> {
        match *self {
            Self::Radius {
                lat,
                lon,
                radius_km,
            } => filter_by_radius(lat, lon, radius_km, buildings),
            Self::Rectangle {
                lat_min,
                lat_max,
                lon_min,
                lon_max,
            } => filter_by_rectangle(lat_min, lat_max, lon_min, lon_max, buildings),
        }
    }

    /// Short label used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Radius { .. } => "radius",
            Self::Rectangle { .. } => "rectangle",
        }
    }
}
