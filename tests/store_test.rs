//! Integration tests for the SQLite stores
//!
//! Exercises the settings history and the check ledger against real
//! databases:
//! - seeding and version history
//! - concurrent appends on a shared database file
//! - ledger statistics across both stores

mod common;

use std::sync::Arc;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use geofence_bot::infra::SqliteSettingsStore;
use geofence_bot::{
    CheckLedger, CheckRecord, GeoPoint, SettingsStore, UserId, DEFAULT_CENTER,
    DEFAULT_RADIUS_METERS,
};

use common::*;

// ============================================================================
// Settings History
// ============================================================================

#[tokio::test]
async fn test_seeded_store_reports_default_geofence() {
    let store = settings_store().await;

    let config = store.current().await.unwrap().unwrap();
    assert_eq!(config.center, DEFAULT_CENTER);
    assert_eq!(config.radius_meters, DEFAULT_RADIUS_METERS);
    assert!(config.set_by.is_system());
}

#[tokio::test]
async fn test_appended_config_round_trips_through_storage() {
    let store = settings_store().await;

    let appended = store
        .append(GeoPoint::new(51.5074, -0.1278), 2_500, UserId::new(42), "alice")
        .await
        .unwrap();

    let current = store.current().await.unwrap().unwrap();
    assert_eq!(current, appended);
    assert_eq!(current.set_by, UserId::new(42));
    assert_eq!(current.set_by_label, "alice");
    assert_eq!(current.created_at, appended.created_at);
}

#[tokio::test]
async fn test_rejected_append_preserves_current_version() {
    let store = settings_store().await;
    let before = store.current().await.unwrap().unwrap();

    let err = store
        .append(GeoPoint::new(91.0, 0.0), 1_000, UserId::new(42), "alice")
        .await
        .unwrap_err();
    assert!(err.is_recoverable());

    let after = store.current().await.unwrap().unwrap();
    assert_eq!(before, after);
}

/// Concurrent appends against a shared database file must interleave to a
/// history where the current version is exactly one of the appended
/// configurations, never a field-wise mix.
#[tokio::test]
async fn test_concurrent_appends_converge_to_one_version() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("geofence.db");
    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .expect("file-backed pool");

    let store = Arc::new(SqliteSettingsStore::new(pool.clone()));
    store.initialize().await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8i64 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .append(
                    GeoPoint::new(10.0 + i as f64, 20.0 + i as f64),
                    1_000 + i,
                    UserId::new(100 + i),
                    &format!("admin-{i}"),
                )
                .await
        }));
    }

    let mut appended = Vec::new();
    for handle in handles {
        appended.push(handle.await.expect("join").expect("append"));
    }

    let current = store.current().await.unwrap().unwrap();
    assert!(
        appended.contains(&current),
        "current version must be one of the appended configurations"
    );

    // Seed plus every append; nothing lost or overwritten.
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM global_location_settings")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 9);
}

// ============================================================================
// Check Ledger
// ============================================================================

#[tokio::test]
async fn test_ledger_stats_reflect_appends() {
    let ledger = check_ledger().await;

    for i in 0..10 {
        let record = CheckRecord::new(
            UserId::new(i),
            format!("user-{i}"),
            nyc(),
            i < 7,
        );
        ledger.append(&record).await.unwrap();
    }

    let stats = ledger.stats(Utc::now()).await.unwrap();
    assert_eq!(stats.total, 10);
    assert_eq!(stats.passed, 7);
    assert_eq!(stats.recent_24h, 10);
    assert!((stats.pass_rate() - 70.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_ledger_records_out_of_range_checks_too() {
    let ledger = check_ledger().await;

    let record = CheckRecord::new(UserId::new(5), "bob", two_km_north(), false);
    ledger.append(&record).await.unwrap();

    let stats = ledger.stats(Utc::now()).await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.passed, 0);
}

#[tokio::test]
async fn test_empty_ledger_stats_are_zero() {
    let ledger = check_ledger().await;

    let stats = ledger.stats(Utc::now()).await.unwrap();
    assert_eq!(stats.total, 0);
    assert_eq!(stats.passed, 0);
    assert_eq!(stats.recent_24h, 0);
    assert_eq!(stats.pass_rate(), 0.0);
}

// ============================================================================
// Shared Database
// ============================================================================

/// Both stores share one pool in production; make sure their tables coexist
/// and writes to one are invisible to the other.
#[tokio::test]
async fn test_stores_share_a_database() {
    let (settings, ledger) = stores().await;

    settings
        .append(GeoPoint::new(48.8566, 2.3522), 300, UserId::new(7), "carol")
        .await
        .unwrap();
    ledger
        .append(&CheckRecord::new(UserId::new(8), "dave", nyc(), true))
        .await
        .unwrap();

    let config = settings.current().await.unwrap().unwrap();
    assert_eq!(config.radius_meters, 300);

    let stats = ledger.stats(Utc::now()).await.unwrap();
    assert_eq!(stats.total, 1);
}

#[tokio::test]
async fn test_from_path_creates_database_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("fresh.db");

    let store = SqliteSettingsStore::from_path(path.to_str().unwrap())
        .await
        .unwrap();
    store.initialize().await.unwrap();

    assert!(path.exists());
    assert!(store.current().await.unwrap().is_some());
}

#[tokio::test]
async fn test_unseeded_store_reports_no_configuration() {
    let (settings, ledger) = unseeded_stores().await;

    assert!(settings.current().await.unwrap().is_none());
    let stats = ledger.stats(Utc::now()).await.unwrap();
    assert_eq!(stats.total, 0);
}
