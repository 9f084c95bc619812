//! Request workflows orchestrating the stores and the geofence evaluator.

mod admin;
mod verify;

pub use admin::*;
pub use verify::*;
