//! SQLite-backed check ledger.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::sqlite::SqlitePool;
use tracing::instrument;

use crate::domain::{CheckRecord, CheckStats, RECENT_WINDOW_HOURS};
use crate::infra::{CheckLedger, Result};

/// SQLite implementation of the check ledger.
pub struct SqliteCheckLedger {
    pool: SqlitePool,
}

impl SqliteCheckLedger {
    /// Create a ledger over an existing connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the table if needed.
    pub async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_checks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                username TEXT NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                is_in_range INTEGER NOT NULL,
                checked_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl CheckLedger for SqliteCheckLedger {
    #[instrument(skip(self, record), fields(user = record.user.0, in_range = record.in_range))]
    async fn append(&self, record: &CheckRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_checks
                (user_id, username, latitude, longitude, is_in_range, checked_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.user.0)
        .bind(&record.user_label)
        .bind(record.point.latitude)
        .bind(record.point.longitude)
        .bind(record.in_range)
        .bind(record.checked_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn stats(&self, now: DateTime<Utc>) -> Result<CheckStats> {
        let cutoff = (now - Duration::hours(RECENT_WINDOW_HOURS)).to_rfc3339();

        // One statement, so the three counts come from the same snapshot.
        let (total, passed, recent_24h): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN is_in_range = 1 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN checked_at > ? THEN 1 ELSE 0 END), 0)
            FROM user_checks
            "#,
        )
        .bind(&cutoff)
        .fetch_one(&self.pool)
        .await?;

        Ok(CheckStats {
            total,
            passed,
            recent_24h,
        })
    }
}
