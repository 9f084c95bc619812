//! Identity types for the geofence bot.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric user identity from the messaging gateway.
///
/// Telegram assigns every account a stable integer id; the bot treats it as
/// opaque. `UserId::SYSTEM` is the sentinel identity that seeded
/// configurations are attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl UserId {
    /// Sentinel identity for records created by the process itself.
    pub const SYSTEM: UserId = UserId(0);

    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }

    pub fn is_system(&self) -> bool {
        *self == Self::SYSTEM
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Display label attributed to the system identity on seeded rows.
pub const SYSTEM_LABEL: &str = "system";
