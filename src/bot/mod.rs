//! Telegram gateway: API client, update classification, and the reply router.

pub mod api;
pub mod event;
pub mod router;

pub use api::{location_keyboard, BotClient, SHARE_LOCATION_LABEL};
pub use event::{Inbound, InboundEvent};
pub use router::{Reply, Router};
