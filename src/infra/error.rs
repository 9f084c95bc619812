//! Error types for the geofence bot.

use thiserror::Error;

/// Errors that can occur while handling a request.
///
/// `Validation`, `Permission`, `NoConfig`, and `InvalidCoordinate` are
/// expected business-rule failures: they end the current request with a
/// corrective user message and mutate nothing. `Database`, `Telegram`,
/// `Config`, and `Internal` are operational failures.
#[derive(Error, Debug)]
pub enum GeofenceError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Coordinate outside the valid latitude/longitude ranges
    #[error("coordinate out of range: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// Malformed or out-of-range input
    #[error("validation error: {0}")]
    Validation(String),

    /// Actor is not in the administrator allow-list
    #[error("permission denied")]
    Permission,

    /// No geofence configuration exists yet
    #[error("no geofence configuration exists")]
    NoConfig,

    /// Telegram Bot API transport or decode failure
    #[error("telegram api error: {0}")]
    Telegram(String),

    /// Invalid process configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl GeofenceError {
    /// Whether this error is an expected business-rule failure that the
    /// requester can correct, as opposed to an operational fault.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GeofenceError::Validation(_)
                | GeofenceError::Permission
                | GeofenceError::NoConfig
                | GeofenceError::InvalidCoordinate { .. }
        )
    }

    /// Corrective reply text for recoverable errors.
    ///
    /// `None` for operational failures, which are answered generically and
    /// logged instead. The permission text stays vague on purpose: it names
    /// neither the admins nor the reason.
    pub fn user_message(&self) -> Option<String> {
        match self {
            GeofenceError::Validation(reason) => Some(format!("\u{274C} {reason}")),
            GeofenceError::InvalidCoordinate {
                latitude,
                longitude,
            } => Some(format!(
                "\u{274C} Those coordinates are out of range: {latitude}, {longitude}."
            )),
            GeofenceError::Permission => {
                Some("This command is restricted to administrators.".to_string())
            }
            GeofenceError::NoConfig => Some(
                "No geofence is configured yet. An administrator can set one with /setlocation."
                    .to_string(),
            ),
            _ => None,
        }
    }
}

/// Result type for geofence bot operations.
pub type Result<T> = std::result::Result<T, GeofenceError>;
