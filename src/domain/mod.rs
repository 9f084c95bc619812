//! Domain models for the geofence bot.
//!
//! Pure value types plus the geodesic distance and geofence evaluation
//! functions. Nothing in here touches storage or the network.

mod check;
mod geo;
mod settings;
mod types;

pub use check::*;
pub use geo::*;
pub use settings::*;
pub use types::*;
