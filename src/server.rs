//! Bot bootstrap for the geofence verification service.
//!
//! This module wires together:
//! - configuration
//! - the SQLite connection pool and stores
//! - the verification and admin workflows
//! - the Telegram long-polling loop

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use crate::bot::{location_keyboard, BotClient, Inbound, Router};
use crate::infra::{
    CheckLedger, GeofenceError, Result, SettingsStore, SqliteCheckLedger, SqliteSettingsStore,
};
use crate::workflow::{AdminService, VerificationService};

/// Long-poll timeout requested from Telegram.
const POLL_TIMEOUT_SECS: u64 = 30;

/// Delay before retrying a failed `getUpdates` call.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token issued by BotFather.
    pub bot_token: String,
    /// User ids allowed to run admin commands.
    pub admin_ids: HashSet<i64>,
    /// SQLite database file path.
    pub database_path: String,
    /// Maximum database connections.
    pub max_connections: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `BOT_TOKEN` is required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let bot_token = std::env::var("BOT_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| GeofenceError::Config("BOT_TOKEN is not set".to_string()))?;

        let admin_ids = match std::env::var("ADMIN_IDS") {
            Ok(raw) => parse_admin_ids(&raw)?,
            Err(_) => HashSet::new(),
        };

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "geofence.db".to_string());

        let max_connections: u32 = std::env::var("MAX_DB_CONNECTIONS")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            bot_token,
            admin_ids,
            database_path,
            max_connections,
        })
    }
}

/// Parse the comma-separated `ADMIN_IDS` value.
fn parse_admin_ids(raw: &str) -> Result<HashSet<i64>> {
    let mut ids = HashSet::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let id: i64 = part.parse().map_err(|_| {
            GeofenceError::Config(format!("ADMIN_IDS entry {part:?} is not a valid user id"))
        })?;
        ids.insert(id);
    }
    Ok(ids)
}

/// Start the bot and poll for updates until the process is stopped.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting geofence bot v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!("Configuration loaded");
    info!("  Database path: {}", config.database_path);
    info!("  Admin ids: {}", config.admin_ids.len());
    if config.admin_ids.is_empty() {
        warn!("ADMIN_IDS is empty; admin commands will be refused for everyone");
    }

    info!("Opening SQLite database...");
    let options = SqliteConnectOptions::new()
        .filename(&config.database_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;
    info!("Connected to SQLite");

    let settings_store = SqliteSettingsStore::new(pool.clone());
    settings_store.initialize().await?;
    let check_ledger = SqliteCheckLedger::new(pool);
    check_ledger.initialize().await?;

    let settings: Arc<dyn SettingsStore> = Arc::new(settings_store);
    let ledger: Arc<dyn CheckLedger> = Arc::new(check_ledger);

    let verification = VerificationService::new(settings.clone(), ledger.clone());
    let admin = AdminService::new(settings.clone(), ledger.clone());
    let router = Router::new(verification, admin, settings, config.admin_ids.clone());

    let client = BotClient::new(config.bot_token.clone());
    let me = client.get_me().await?;
    info!("Authorized as @{} (id {})", me.label(), me.id);

    info!("Polling for updates...");
    poll_loop(&client, &router).await;

    Ok(())
}

/// Fetch and answer updates forever.
///
/// A failed poll is logged and retried after a delay; a failed send is
/// logged and skipped so one unreachable chat cannot stall the loop.
async fn poll_loop(client: &BotClient, router: &Router) {
    let mut offset = 0i64;
    loop {
        let updates = match client.get_updates(offset, POLL_TIMEOUT_SECS).await {
            Ok(updates) => updates,
            Err(err) => {
                error!(error = %err, "getUpdates failed, retrying");
                tokio::time::sleep(RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let Some(inbound) = Inbound::from_update(&update) else {
                continue;
            };
            let chat_id = inbound.chat_id;
            let reply = router.handle(inbound.event).await;

            let sent = if reply.request_location {
                client
                    .send_message_with_keyboard(chat_id, &reply.text, &location_keyboard())
                    .await
            } else {
                client.send_message(chat_id, &reply.text).await
            };
            if let Err(err) = sent {
                error!(error = %err, chat_id, "failed to send reply");
            }
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();
}
