//! Verification workflow: current settings, evaluation, ledger record.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::domain::{evaluate, CheckRecord, GeoPoint, GeofenceConfig, UserId};
use crate::infra::{CheckLedger, GeofenceError, Result, SettingsStore};

/// Result of one location verification, with the configuration it was
/// evaluated against for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub in_range: bool,
    pub distance_meters: f64,
    pub config: GeofenceConfig,
}

/// Orchestrates a location check: read the current configuration, evaluate
/// the sample against it, and record the outcome.
pub struct VerificationService {
    settings: Arc<dyn SettingsStore>,
    ledger: Arc<dyn CheckLedger>,
}

impl VerificationService {
    pub fn new(settings: Arc<dyn SettingsStore>, ledger: Arc<dyn CheckLedger>) -> Self {
        Self { settings, ledger }
    }

    /// Verify a shared location against the current geofence.
    ///
    /// Fails with `NoConfig` when no configuration exists; nothing is
    /// recorded in that case or on any other failure before the ledger
    /// append.
    #[instrument(skip(self, user_label), fields(user = user.0))]
    pub async fn verify(
        &self,
        user: UserId,
        user_label: &str,
        point: GeoPoint,
    ) -> Result<Verification> {
        let config = self
            .settings
            .current()
            .await?
            .ok_or(GeofenceError::NoConfig)?;

        let eval = evaluate(&point, &config.center, config.radius_meters as f64)?;

        let record = CheckRecord::new(user, user_label, point, eval.in_range);
        self.ledger.append(&record).await?;

        info!(
            in_range = eval.in_range,
            distance_meters = eval.distance_meters,
            "location check recorded"
        );

        Ok(Verification {
            in_range: eval.in_range,
            distance_meters: eval.distance_meters,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DEFAULT_CENTER, SYSTEM_LABEL};
    use crate::infra::{MockCheckLedger, MockSettingsStore};

    fn default_config() -> GeofenceConfig {
        GeofenceConfig::new(DEFAULT_CENTER, 1_000, UserId::SYSTEM, SYSTEM_LABEL)
    }

    #[tokio::test]
    async fn test_verify_records_in_range_outcome() {
        let mut settings = MockSettingsStore::new();
        settings
            .expect_current()
            .returning(|| Ok(Some(default_config())));

        let mut ledger = MockCheckLedger::new();
        ledger
            .expect_append()
            .withf(|r| r.in_range && r.user == UserId::new(7))
            .times(1)
            .returning(|_| Ok(()));

        let service = VerificationService::new(Arc::new(settings), Arc::new(ledger));
        let result = service
            .verify(UserId::new(7), "alice", DEFAULT_CENTER)
            .await
            .unwrap();

        assert!(result.in_range);
        assert!(result.distance_meters < 1e-6);
        assert_eq!(result.config.radius_meters, 1_000);
    }

    #[tokio::test]
    async fn test_verify_records_out_of_range_outcome() {
        let mut settings = MockSettingsStore::new();
        settings
            .expect_current()
            .returning(|| Ok(Some(default_config())));

        let mut ledger = MockCheckLedger::new();
        ledger
            .expect_append()
            .withf(|r| !r.in_range)
            .times(1)
            .returning(|_| Ok(()));

        let service = VerificationService::new(Arc::new(settings), Arc::new(ledger));
        // Roughly 2 km north of the fence center.
        let result = service
            .verify(UserId::new(7), "alice", GeoPoint::new(40.7308, -74.0060))
            .await
            .unwrap();

        assert!(!result.in_range);
        assert!(result.distance_meters > 1_000.0);
    }

    #[tokio::test]
    async fn test_missing_config_appends_nothing() {
        let mut settings = MockSettingsStore::new();
        settings.expect_current().returning(|| Ok(None));

        let mut ledger = MockCheckLedger::new();
        ledger.expect_append().times(0);

        let service = VerificationService::new(Arc::new(settings), Arc::new(ledger));
        let err = service
            .verify(UserId::new(7), "alice", DEFAULT_CENTER)
            .await
            .unwrap_err();

        assert!(matches!(err, GeofenceError::NoConfig));
    }

    #[tokio::test]
    async fn test_invalid_coordinate_appends_nothing() {
        let mut settings = MockSettingsStore::new();
        settings
            .expect_current()
            .returning(|| Ok(Some(default_config())));

        let mut ledger = MockCheckLedger::new();
        ledger.expect_append().times(0);

        let service = VerificationService::new(Arc::new(settings), Arc::new(ledger));
        let err = service
            .verify(UserId::new(7), "alice", GeoPoint::new(91.0, 0.0))
            .await
            .unwrap_err();

        assert!(matches!(err, GeofenceError::InvalidCoordinate { .. }));
    }

    #[tokio::test]
    async fn test_settings_failure_propagates_before_any_write() {
        let mut settings = MockSettingsStore::new();
        settings
            .expect_current()
            .returning(|| Err(GeofenceError::Database(sqlx::Error::PoolClosed)));

        let mut ledger = MockCheckLedger::new();
        ledger.expect_append().times(0);

        let service = VerificationService::new(Arc::new(settings), Arc::new(ledger));
        let err = service
            .verify(UserId::new(7), "alice", DEFAULT_CENTER)
            .await
            .unwrap_err();

        assert!(matches!(err, GeofenceError::Database(_)));
    }

    #[tokio::test]
    async fn test_ledger_failure_fails_the_request() {
        let mut settings = MockSettingsStore::new();
        settings
            .expect_current()
            .returning(|| Ok(Some(default_config())));

        let mut ledger = MockCheckLedger::new();
        ledger
            .expect_append()
            .times(1)
            .returning(|_| Err(GeofenceError::Database(sqlx::Error::PoolClosed)));

        let service = VerificationService::new(Arc::new(settings), Arc::new(ledger));
        let err = service
            .verify(UserId::new(7), "alice", DEFAULT_CENTER)
            .await
            .unwrap_err();

        assert!(matches!(err, GeofenceError::Database(_)));
    }
}
