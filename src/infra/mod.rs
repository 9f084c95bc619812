//! Infrastructure layer for the geofence bot.
//!
//! Contains the error taxonomy, the store trait definitions, and their
//! SQLite implementations.

mod error;
pub mod sqlite;
mod traits;

pub use error::*;
pub use sqlite::{SqliteCheckLedger, SqliteSettingsStore};
pub use traits::*;
