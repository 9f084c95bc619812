//! Geofence Verification Bot Library
//!
//! Telegram bot that verifies shared locations against a single global
//! geofence, with an append-only configuration history and a ledger of
//! every check performed.
//!
//! ## Modules
//!
//! - [`domain`] - Core domain types (geofence configs, checks, geodesic math)
//! - [`infra`] - Infrastructure implementations (SQLite stores, error types)
//! - [`workflow`] - Verification and administration workflows
//! - [`bot`] - Telegram gateway (API client, event classification, routing)
//! - [`server`] - Process bootstrap and the polling loop

pub mod bot;
pub mod domain;
pub mod infra;
pub mod server;
pub mod workflow;

// Re-export commonly used types
pub use domain::{
    CheckRecord, CheckStats, Evaluation, GeoPoint, GeofenceConfig, UserId, DEFAULT_CENTER,
    DEFAULT_RADIUS_METERS, MAX_RADIUS_METERS, RECENT_WINDOW_HOURS,
};

pub use infra::{
    CheckLedger, GeofenceError, Result, SettingsStore, SqliteCheckLedger, SqliteSettingsStore,
};
