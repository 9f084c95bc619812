//! Administration workflow: configuration updates and summary statistics.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::domain::{GeoPoint, GeofenceConfig, UserId};
use crate::infra::{CheckLedger, GeofenceError, Result, SettingsStore};

/// Summary statistics combining the current configuration with ledger
/// aggregates. `pass_rate` is a percentage, 0 when no checks exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub config: GeofenceConfig,
    pub total: i64,
    pub passed: i64,
    pub recent_24h: i64,
    pub pass_rate: f64,
}

/// Administrative operations over the settings store and check ledger.
///
/// The administrator allow-list is enforced at the gateway boundary before
/// these methods are invoked; this service only applies the configuration
/// validation rules.
pub struct AdminService {
    settings: Arc<dyn SettingsStore>,
    ledger: Arc<dyn CheckLedger>,
}

impl AdminService {
    pub fn new(settings: Arc<dyn SettingsStore>, ledger: Arc<dyn CheckLedger>) -> Self {
        Self { settings, ledger }
    }

    /// Append a new geofence configuration version.
    #[instrument(skip(self, actor_label), fields(actor = actor.0))]
    pub async fn set_config(
        &self,
        actor: UserId,
        actor_label: &str,
        center: GeoPoint,
        radius_meters: i64,
    ) -> Result<GeofenceConfig> {
        let config = self
            .settings
            .append(center, radius_meters, actor, actor_label)
            .await?;
        info!(radius_meters, "geofence configuration updated");
        Ok(config)
    }

    /// Combine the current configuration with ledger aggregates as of `now`.
    ///
    /// Fails with `NoConfig` when no configuration exists.
    pub async fn stats(&self, now: DateTime<Utc>) -> Result<StatsReport> {
        let config = self
            .settings
            .current()
            .await?
            .ok_or(GeofenceError::NoConfig)?;
        let stats = self.ledger.stats(now).await?;

        Ok(StatsReport {
            config,
            total: stats.total,
            passed: stats.passed,
            recent_24h: stats.recent_24h,
            pass_rate: stats.pass_rate(),
        })
    }
}
