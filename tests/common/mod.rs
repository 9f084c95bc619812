//! Common test utilities and fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use geofence_bot::infra::{SqliteCheckLedger, SqliteSettingsStore};
use geofence_bot::{CheckLedger, GeoPoint, SettingsStore, UserId};

/// The seeded default center (Lower Manhattan).
pub fn nyc() -> GeoPoint {
    GeoPoint::new(40.7128, -74.0060)
}

/// Roughly two kilometers north of the default center.
pub fn two_km_north() -> GeoPoint {
    GeoPoint::new(40.7308, -74.0060)
}

/// The user id configured as admin in router fixtures.
pub fn admin_user() -> UserId {
    UserId::new(1)
}

/// Open an isolated in-memory database.
///
/// One connection only: every pooled connection would otherwise open its
/// own empty in-memory database.
pub async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool")
}

/// Initialized settings store over its own in-memory database.
pub async fn settings_store() -> SqliteSettingsStore {
    let store = SqliteSettingsStore::new(memory_pool().await);
    store.initialize().await.expect("initialize settings store");
    store
}

/// Initialized check ledger over its own in-memory database.
pub async fn check_ledger() -> SqliteCheckLedger {
    let ledger = SqliteCheckLedger::new(memory_pool().await);
    ledger.initialize().await.expect("initialize check ledger");
    ledger
}

/// Both stores over one shared in-memory database, as they are deployed.
pub async fn stores() -> (Arc<dyn SettingsStore>, Arc<dyn CheckLedger>) {
    let pool = memory_pool().await;
    let settings = SqliteSettingsStore::new(pool.clone());
    settings
        .initialize()
        .await
        .expect("initialize settings store");
    let ledger = SqliteCheckLedger::new(pool);
    ledger.initialize().await.expect("initialize check ledger");
    (Arc::new(settings), Arc::new(ledger))
}

/// Stores over one database where the settings table exists but was never
/// seeded, to exercise the not-configured path.
pub async fn unseeded_stores() -> (Arc<dyn SettingsStore>, Arc<dyn CheckLedger>) {
    let pool = memory_pool().await;
    sqlx::query(
        "CREATE TABLE global_location_settings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            latitude REAL NOT NULL, longitude REAL NOT NULL, radius INTEGER NOT NULL,
            set_by INTEGER NOT NULL, set_by_username TEXT NOT NULL,
            created_at TEXT NOT NULL, updated_at TEXT NOT NULL
        )",
    )
    .execute(&pool)
    .await
    .expect("create settings table");

    let settings = SqliteSettingsStore::new(pool.clone());
    let ledger = SqliteCheckLedger::new(pool);
    ledger.initialize().await.expect("initialize check ledger");
    (Arc::new(settings), Arc::new(ledger))
}
