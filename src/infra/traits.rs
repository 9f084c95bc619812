//! Trait definitions for the geofence stores.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;

use crate::domain::{CheckRecord, CheckStats, GeoPoint, GeofenceConfig, UserId};

use super::Result;

/// Append-only history of global geofence configurations.
///
/// Invariant: versions are never edited or deleted; the current
/// configuration is always the most recently appended one.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// The latest appended configuration, or `None` if the history is empty.
    ///
    /// Seeding at initialization means `None` should not occur in steady
    /// state, but callers must handle it.
    async fn current(&self) -> Result<Option<GeofenceConfig>>;

    /// Validate and append a new configuration version.
    ///
    /// Fails with `Validation` (out-of-range coordinates, non-positive or
    /// excessive radius) without mutating state. Appends are serialized by
    /// the backing store, so concurrent callers can never produce a
    /// field-wise mix of two versions.
    async fn append(
        &self,
        center: GeoPoint,
        radius_meters: i64,
        set_by: UserId,
        set_by_label: &str,
    ) -> Result<GeofenceConfig>;
}

/// Append-only ledger of location checks.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CheckLedger: Send + Sync {
    /// Record one check. Never rejects a well-formed record; each append is
    /// a single atomic write.
    async fn append(&self, record: &CheckRecord) -> Result<()>;

    /// Aggregate counts as of `now`: total checks, passed checks, and checks
    /// within the trailing 24-hour window. The counts reflect one consistent
    /// snapshot of the ledger.
    async fn stats(&self, now: DateTime<Utc>) -> Result<CheckStats>;
}
