//! SQLite-backed settings history.
//!
//! One row per configuration version; the current configuration is the row
//! with the greatest id. Rows are never updated or deleted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::FromRow;
use tracing::{info, instrument};

use crate::domain::{
    GeoPoint, GeofenceConfig, UserId, DEFAULT_CENTER, DEFAULT_RADIUS_METERS, SYSTEM_LABEL,
};
use crate::infra::{GeofenceError, Result, SettingsStore};

/// SQLite implementation of the settings history.
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    /// Create a store over an existing connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) a database file and build a store over it.
    pub async fn from_path(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        Ok(Self { pool })
    }

    /// Create the table if needed and seed the default configuration when
    /// the history is empty, so `current()` never observes an empty store in
    /// steady state.
    pub async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS global_location_settings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                radius INTEGER NOT NULL,
                set_by INTEGER NOT NULL,
                set_by_username TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM global_location_settings")
            .fetch_one(&self.pool)
            .await?;

        if count == 0 {
            let now = Utc::now().to_rfc3339();
            sqlx::query(
                r#"
                INSERT INTO global_location_settings
                    (latitude, longitude, radius, set_by, set_by_username, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(DEFAULT_CENTER.latitude)
            .bind(DEFAULT_CENTER.longitude)
            .bind(DEFAULT_RADIUS_METERS)
            .bind(UserId::SYSTEM.0)
            .bind(SYSTEM_LABEL)
            .bind(&now)
            .bind(&now)
            .execute(&self.pool)
            .await?;
            info!("seeded default geofence configuration");
        }

        Ok(())
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn current(&self) -> Result<Option<GeofenceConfig>> {
        let row: Option<SettingsRow> = sqlx::query_as(
            r#"
            SELECT latitude, longitude, radius, set_by, set_by_username, created_at
            FROM global_location_settings
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(GeofenceConfig::try_from).transpose()
    }

    #[instrument(skip(self, set_by_label), fields(set_by = set_by.0))]
    async fn append(
        &self,
        center: GeoPoint,
        radius_meters: i64,
        set_by: UserId,
        set_by_label: &str,
    ) -> Result<GeofenceConfig> {
        GeofenceConfig::validate(&center, radius_meters)?;

        let created_at = Utc::now();
        let stamp = created_at.to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO global_location_settings
                (latitude, longitude, radius, set_by, set_by_username, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(center.latitude)
        .bind(center.longitude)
        .bind(radius_meters)
        .bind(set_by.0)
        .bind(set_by_label)
        .bind(&stamp)
        .bind(&stamp)
        .execute(&self.pool)
        .await?;

        info!(radius_meters, "geofence configuration appended");

        Ok(GeofenceConfig {
            center,
            radius_meters,
            set_by,
            set_by_label: set_by_label.to_string(),
            created_at,
        })
    }
}

/// Raw row from the settings table.
#[derive(Debug, FromRow)]
struct SettingsRow {
    latitude: f64,
    longitude: f64,
    radius: i64,
    set_by: i64,
    set_by_username: String,
    created_at: String,
}

impl TryFrom<SettingsRow> for GeofenceConfig {
    type Error = GeofenceError;

    fn try_from(row: SettingsRow) -> Result<Self> {
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| GeofenceError::Internal(format!("invalid created_at: {e}")))?
            .with_timezone(&Utc);

        Ok(GeofenceConfig {
            center: GeoPoint::new(row.latitude, row.longitude),
            radius_meters: row.radius,
            set_by: UserId::new(row.set_by),
            set_by_label: row.set_by_username,
            created_at,
        })
    }
}
