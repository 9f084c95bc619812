//! Verification attempts and their aggregate statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{GeoPoint, UserId};

/// Trailing window used for the "recent checks" statistic.
pub const RECENT_WINDOW_HOURS: i64 = 24;

/// One recorded location check. Immutable; the ledger only appends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRecord {
    /// Identity that shared the location.
    pub user: UserId,

    /// Display label of the requester at check time.
    pub user_label: String,

    /// The sampled location.
    pub point: GeoPoint,

    /// Evaluation outcome against the configuration current at check time.
    pub in_range: bool,

    /// When the check happened.
    pub checked_at: DateTime<Utc>,
}

impl CheckRecord {
    pub fn new(
        user: UserId,
        user_label: impl Into<String>,
        point: GeoPoint,
        in_range: bool,
    ) -> Self {
        Self {
            user,
            user_label: user_label.into(),
            point,
            in_range,
            checked_at: Utc::now(),
        }
    }
}

/// Aggregate counts over the check ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckStats {
    /// All recorded checks.
    pub total: i64,

    /// Checks that evaluated in range.
    pub passed: i64,

    /// Checks within the trailing `RECENT_WINDOW_HOURS` window.
    pub recent_24h: i64,
}

impl CheckStats {
    /// Share of passed checks as a percentage. An empty ledger is 0%.
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64 * 100.0
        }
    }
}
