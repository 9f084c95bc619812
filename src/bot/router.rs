//! Event router: turns classified inbound events into reply text.
//!
//! Admin commands are gated here, before any argument parsing, against an
//! allow-list injected at startup. Recoverable failures become corrective
//! messages via `GeofenceError::user_message`; operational failures are
//! logged and answered generically.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, warn};

use crate::bot::api::SHARE_LOCATION_LABEL;
use crate::bot::event::InboundEvent;
use crate::domain::{GeoPoint, UserId};
use crate::infra::{GeofenceError, SettingsStore};
use crate::workflow::{AdminService, VerificationService};

const CHECK_PROMPT: &str = "Share your location using the button below.";

const SET_LOCATION_USAGE: &str = "Usage: /setlocation <latitude> <longitude> <radius_meters>\n\
     Example: /setlocation 40.7128 -74.0060 1000";

const UNRECOGNIZED: &str =
    "I did not understand that. Send /check and share your location, or /start for an overview.";

const FAILURE: &str = "Something went wrong on our side. Please try again later.";

const ADMIN_HELP: &str = "Admin commands:\n\
     /setlocation <latitude> <longitude> <radius_meters> - move the geofence\n\
     /settings - show the active geofence\n\
     /stats - show check statistics\n\
     Example: /setlocation 40.7128 -74.0060 1000";

/// Outbound reply: text plus whether to attach the share-location keyboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub request_location: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            request_location: false,
        }
    }

    fn with_location_button(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            request_location: true,
        }
    }
}

/// Dispatches inbound events to the workflows and formats the replies.
pub struct Router {
    verification: VerificationService,
    admin: AdminService,
    settings: Arc<dyn SettingsStore>,
    admin_ids: HashSet<i64>,
}

impl Router {
    pub fn new(
        verification: VerificationService,
        admin: AdminService,
        settings: Arc<dyn SettingsStore>,
        admin_ids: HashSet<i64>,
    ) -> Self {
        Self {
            verification,
            admin,
            settings,
            admin_ids,
        }
    }

    fn is_admin(&self, user: UserId) -> bool {
        self.admin_ids.contains(&user.as_i64())
    }

    /// Answer one event. Never fails; errors become reply text.
    pub async fn handle(&self, event: InboundEvent) -> Reply {
        match event {
            InboundEvent::Start { user_label, .. } => Reply::with_location_button(format!(
                "Hi {user_label}! I verify whether a shared location falls inside the \
                 allowed area.\nUse the button below or send /check to begin."
            )),
            InboundEvent::CheckRequest { user } => self.handle_check_request(user).await,
            InboundEvent::LocationShared {
                user,
                user_label,
                latitude,
                longitude,
            } => {
                self.handle_location(user, &user_label, latitude, longitude)
                    .await
            }
            InboundEvent::SetConfigCommand {
                actor,
                actor_label,
                args,
            } => self.handle_set_config(actor, &actor_label, &args).await,
            InboundEvent::SettingsQuery => self.handle_settings().await,
            InboundEvent::StatsQuery { actor } => self.handle_stats(actor).await,
            InboundEvent::AdminHelp { actor } => self.handle_admin_help(actor),
            InboundEvent::UnrecognizedText { text } => {
                // Some clients send the button label as plain text instead
                // of a location; prompt again rather than shrugging.
                if text == SHARE_LOCATION_LABEL {
                    return Reply::with_location_button(CHECK_PROMPT);
                }
                debug!(text = %text, "unrecognized message");
                Reply::text(UNRECOGNIZED)
            }
        }
    }

    /// `/check` prompts for a location but verifies nothing itself.
    async fn handle_check_request(&self, user: UserId) -> Reply {
        match self.settings.current().await {
            Ok(Some(_)) => {
                debug!(user = user.as_i64(), "check prompt requested");
                Reply::with_location_button(CHECK_PROMPT)
            }
            Ok(None) => self.error_reply(GeofenceError::NoConfig),
            Err(err) => self.error_reply(err),
        }
    }

    async fn handle_location(
        &self,
        user: UserId,
        user_label: &str,
        latitude: f64,
        longitude: f64,
    ) -> Reply {
        let point = GeoPoint::new(latitude, longitude);
        match self.verification.verify(user, user_label, point).await {
            Ok(outcome) => {
                let status = if outcome.in_range {
                    "\u{2705} You are inside the allowed area."
                } else {
                    "\u{274C} You are outside the allowed area."
                };
                Reply::text(format!(
                    "{status}\nLatitude: {:.6}\nLongitude: {:.6}\nDistance: {:.2} m\n\
                     Allowed radius: {} m",
                    point.latitude,
                    point.longitude,
                    outcome.distance_meters,
                    outcome.config.radius_meters
                ))
            }
            Err(err) => self.error_reply(err),
        }
    }

    async fn handle_set_config(
        &self,
        actor: UserId,
        actor_label: &str,
        args: &[String],
    ) -> Reply {
        if !self.is_admin(actor) {
            warn!(actor = actor.as_i64(), "rejected /setlocation from non-admin");
            return self.error_reply(GeofenceError::Permission);
        }
        let Some((latitude, longitude, radius_meters)) = parse_set_config_args(args) else {
            return Reply::text(SET_LOCATION_USAGE);
        };
        let center = GeoPoint::new(latitude, longitude);
        match self
            .admin
            .set_config(actor, actor_label, center, radius_meters)
            .await
        {
            Ok(config) => Reply::text(format!(
                "\u{2705} Geofence updated.\nCenter: {:.6}, {:.6}\nRadius: {} m",
                config.center.latitude, config.center.longitude, config.radius_meters
            )),
            Err(err) => self.error_reply(err),
        }
    }

    async fn handle_settings(&self) -> Reply {
        match self.settings.current().await {
            Ok(Some(config)) => Reply::text(format!(
                "Current geofence:\nCenter: {:.6}, {:.6}\nRadius: {} m\nSet by: {} at {}",
                config.center.latitude,
                config.center.longitude,
                config.radius_meters,
                config.set_by_label,
                config.created_at.format("%Y-%m-%d %H:%M UTC")
            )),
            Ok(None) => self.error_reply(GeofenceError::NoConfig),
            Err(err) => self.error_reply(err),
        }
    }

    async fn handle_stats(&self, actor: UserId) -> Reply {
        if !self.is_admin(actor) {
            warn!(actor = actor.as_i64(), "rejected /stats from non-admin");
            return self.error_reply(GeofenceError::Permission);
        }
        match self.admin.stats(Utc::now()).await {
            Ok(report) => Reply::text(format!(
                "\u{1F4CA} Check statistics\nCenter: {:.6}, {:.6}\nRadius: {} m\n\
                 Total checks: {}\nPassed: {}\nPass rate: {:.1}%\n\
                 Checks in the last 24h: {}",
                report.config.center.latitude,
                report.config.center.longitude,
                report.config.radius_meters,
                report.total,
                report.passed,
                report.pass_rate,
                report.recent_24h
            )),
            Err(err) => self.error_reply(err),
        }
    }

    fn handle_admin_help(&self, actor: UserId) -> Reply {
        if !self.is_admin(actor) {
            warn!(actor = actor.as_i64(), "rejected /adminhelp from non-admin");
            return self.error_reply(GeofenceError::Permission);
        }
        Reply::text(ADMIN_HELP)
    }

    /// Map an error to reply text: corrective for recoverable classes,
    /// generic (plus an error log) for operational ones.
    fn error_reply(&self, err: GeofenceError) -> Reply {
        match err.user_message() {
            Some(text) => Reply::text(text),
            None => {
                error!(error = %err, "request handling failed");
                Reply::text(FAILURE)
            }
        }
    }
}

/// Parse `/setlocation` arguments: exactly latitude, longitude, radius.
fn parse_set_config_args(args: &[String]) -> Option<(f64, f64, i64)> {
    if args.len() != 3 {
        return None;
    }
    let latitude: f64 = args[0].parse().ok()?;
    let longitude: f64 = args[1].parse().ok()?;
    let radius_meters: i64 = args[2].parse().ok()?;
    Some((latitude, longitude, radius_meters))
}
