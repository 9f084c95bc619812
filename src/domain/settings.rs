//! Geofence configuration versions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{GeoPoint, UserId};
use crate::infra::{GeofenceError, Result};

/// Hard upper bound on the configurable radius.
pub const MAX_RADIUS_METERS: i64 = 50_000;

/// Seeded default fence: lower Manhattan, 1 km.
pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
    latitude: 40.7128,
    longitude: -74.0060,
};
pub const DEFAULT_RADIUS_METERS: i64 = 1_000;

/// One version of the global geofence configuration.
///
/// Configurations are immutable once created; changing the fence appends a
/// new version rather than editing an existing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeofenceConfig {
    /// Fence center.
    pub center: GeoPoint,

    /// Fence radius in meters, in (0, MAX_RADIUS_METERS].
    pub radius_meters: i64,

    /// Identity that appended this version.
    pub set_by: UserId,

    /// Display label of the setter at append time.
    pub set_by_label: String,

    /// When this version was appended.
    pub created_at: DateTime<Utc>,
}

impl GeofenceConfig {
    pub fn new(
        center: GeoPoint,
        radius_meters: i64,
        set_by: UserId,
        set_by_label: impl Into<String>,
    ) -> Self {
        Self {
            center,
            radius_meters,
            set_by,
            set_by_label: set_by_label.into(),
            created_at: Utc::now(),
        }
    }

    /// Validate a candidate configuration before it is appended.
    ///
    /// Rejects out-of-range coordinates, non-positive radii, and radii above
    /// `MAX_RADIUS_METERS`. Field order matters for the user-facing message:
    /// coordinates are checked before the radius.
    pub fn validate(center: &GeoPoint, radius_meters: i64) -> Result<()> {
        if !(-90.0..=90.0).contains(&center.latitude) {
            return Err(GeofenceError::Validation(format!(
                "latitude {} is outside [-90, 90]",
                center.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&center.longitude) {
            return Err(GeofenceError::Validation(format!(
                "longitude {} is outside [-180, 180]",
                center.longitude
            )));
        }
        if radius_meters <= 0 {
            return Err(GeofenceError::Validation(
                "radius must be greater than zero".to_string(),
            ));
        }
        if radius_meters > MAX_RADIUS_METERS {
            return Err(GeofenceError::Validation(format!(
                "radius {radius_meters} exceeds the maximum of {MAX_RADIUS_METERS} meters"
            )));
        }
        Ok(())
    }
}
