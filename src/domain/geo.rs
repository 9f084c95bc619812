//! Geodesic distance and geofence evaluation.
//!
//! Distances are computed on the WGS84 ellipsoid with Karney's algorithm
//! (via `geographiclib-rs`), not a spherical approximation. Both functions
//! here are pure: no clock, no I/O, no shared state.

use geographiclib_rs::{Geodesic, InverseGeodesic};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::infra::{GeofenceError, Result};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Degrees north, valid range [-90, 90].
    pub latitude: f64,
    /// Degrees east, valid range [-180, 180].
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check both coordinates against their valid ranges.
    ///
    /// NaN fails the range check, so non-finite input is rejected too.
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude)
        {
            return Err(GeofenceError::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }
        Ok(())
    }
}

/// Outcome of evaluating a sample point against a geofence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Whether the sample falls inside the fence (boundary inclusive).
    pub in_range: bool,
    /// Geodesic distance from the sample to the fence center, in meters.
    pub distance_meters: f64,
}

fn wgs84() -> &'static Geodesic {
    static GEOD: OnceLock<Geodesic> = OnceLock::new();
    GEOD.get_or_init(Geodesic::wgs84)
}

/// Geodesic distance in meters between two points.
///
/// Symmetric, and zero for identical points. Guards its own inputs even
/// though callers normally validate first.
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> Result<f64> {
    a.validate()?;
    b.validate()?;

    let meters: f64 = wgs84().inverse(a.latitude, a.longitude, b.latitude, b.longitude);
    Ok(meters)
}

/// Evaluate a sample point against a circular geofence.
///
/// A sample exactly on the boundary (`distance == radius`) counts as
/// in range.
pub fn evaluate(sample: &GeoPoint, center: &GeoPoint, radius_meters: f64) -> Result<Evaluation> {
    let distance_meters = distance(sample, center)?;
    Ok(Evaluation {
        in_range: distance_meters <= radius_meters,
        distance_meters,
    })
}
