//! SQLite implementations of the geofence stores.

mod checks;
mod settings;

pub use checks::*;
pub use settings::*;
