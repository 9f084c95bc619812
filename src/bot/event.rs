//! Classification of raw Telegram updates into router events.

use crate::bot::api::Update;
use crate::domain::UserId;

/// One event the router knows how to answer.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// `/start` from a new or returning chat.
    Start { user: UserId, user_label: String },
    /// `/check`; prompts for a location, does not verify anything itself.
    CheckRequest { user: UserId },
    /// A location attachment; triggers the verification workflow.
    LocationShared {
        user: UserId,
        user_label: String,
        latitude: f64,
        longitude: f64,
    },
    /// `/setlocation <lat> <lon> <radius>`; admin only.
    SetConfigCommand {
        actor: UserId,
        actor_label: String,
        args: Vec<String>,
    },
    /// `/settings`; shows the active geofence.
    SettingsQuery,
    /// `/stats`; admin only.
    StatsQuery { actor: UserId },
    /// `/adminhelp`; admin only.
    AdminHelp { actor: UserId },
    /// Anything else; answered with usage hints.
    UnrecognizedText { text: String },
}

/// An event plus the chat it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    pub chat_id: i64,
    pub event: InboundEvent,
}

impl Inbound {
    /// Classify an update. Returns `None` for updates the bot ignores:
    /// no message, no sender, or a message with neither text nor location.
    pub fn from_update(update: &Update) -> Option<Inbound> {
        let message = update.message.as_ref()?;
        let from = message.from.as_ref()?;
        let chat_id = message.chat.id;
        let user = UserId::new(from.id);
        let user_label = from.label().to_string();

        if let Some(location) = message.location {
            return Some(Inbound {
                chat_id,
                event: InboundEvent::LocationShared {
                    user,
                    user_label,
                    latitude: location.latitude,
                    longitude: location.longitude,
                },
            });
        }

        let text = message.text.as_deref()?.trim();
        if text.is_empty() {
            return None;
        }

        if let Some(rest) = text.strip_prefix('/') {
            let mut parts = rest.split_whitespace();
            let command = parts.next().unwrap_or("");
            // Group chats suffix commands with the bot name: /check@some_bot.
            let command = command.split('@').next().unwrap_or(command);
            let args: Vec<String> = parts.map(str::to_string).collect();

            let event = match command {
                "start" => InboundEvent::Start { user, user_label },
                "check" => InboundEvent::CheckRequest { user },
                "setlocation" => InboundEvent::SetConfigCommand {
                    actor: user,
                    actor_label: user_label,
                    args,
                },
                "settings" => InboundEvent::SettingsQuery,
                "stats" => InboundEvent::StatsQuery { actor: user },
                "adminhelp" => InboundEvent::AdminHelp { actor: user },
                _ => InboundEvent::UnrecognizedText {
                    text: text.to_string(),
                },
            };
            return Some(Inbound { chat_id, event });
        }

        Some(Inbound {
            chat_id,
            event: InboundEvent::UnrecognizedText {
                text: text.to_string(),
            },
        })
    }
}
