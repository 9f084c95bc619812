use std::collections::VecDeque;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use geofence_bot::domain::RECENT_WINDOW_HOURS;
use geofence_bot::infra::{CheckLedger, SettingsStore, SqliteCheckLedger, SqliteSettingsStore};

fn print_help() {
    eprintln!(
        "\
geofence-admin

USAGE:
  geofence-admin <command> [options]

COMMANDS:
  current    Show the active geofence configuration
  history    Show the configuration append history
  stats      Show check ledger statistics
  checks     Show recent location checks

COMMON OPTIONS:
  --database <path>    (defaults to env DATABASE_PATH, then geofence.db)

history OPTIONS:
  --limit <n>          (default: 10)

checks OPTIONS:
  --limit <n>          (default: 20)
  --user <id>          (optional) Only checks by this user id
"
    );
}

fn database_path(database: Option<String>) -> String {
    database
        .or_else(|| std::env::var("DATABASE_PATH").ok())
        .unwrap_or_else(|| "geofence.db".to_string())
}

async fn open_pool(path: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(false);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    Ok(pool)
}

#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    id: i64,
    latitude: f64,
    longitude: f64,
    radius: i64,
    set_by: i64,
    set_by_username: String,
    created_at: String,
}

#[derive(Debug, sqlx::FromRow)]
struct CheckRow {
    id: i64,
    user_id: i64,
    username: String,
    latitude: f64,
    longitude: f64,
    is_in_range: bool,
    checked_at: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args: VecDeque<String> = std::env::args().skip(1).collect();
    let Some(command) = args.pop_front() else {
        print_help();
        return Ok(());
    };

    if matches!(command.as_str(), "-h" | "--help" | "help") {
        print_help();
        return Ok(());
    }

    match command.as_str() {
        "current" => {
            let mut database: Option<String> = None;
            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--database" => {
                        database = Some(
                            args.pop_front()
                                .ok_or_else(|| anyhow::anyhow!("missing value for --database"))?,
                        );
                    }
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unknown option {other:?}"),
                }
            }

            let pool = open_pool(&database_path(database)).await?;
            let store = SqliteSettingsStore::new(pool);

            match store.current().await? {
                Some(config) => {
                    println!(
                        "Center:  {:.6}, {:.6}",
                        config.center.latitude, config.center.longitude
                    );
                    println!("Radius:  {} m", config.radius_meters);
                    println!(
                        "Set by:  {} ({})",
                        config.set_by_label,
                        config.set_by.as_i64()
                    );
                    println!("Created: {}", config.created_at.to_rfc3339());
                }
                None => println!("no geofence configuration"),
            }
            Ok(())
        }
        "history" => {
            let mut database: Option<String> = None;
            let mut limit: i64 = 10;
            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--database" => {
                        database = Some(
                            args.pop_front()
                                .ok_or_else(|| anyhow::anyhow!("missing value for --database"))?,
                        );
                    }
                    "--limit" => {
                        limit = args
                            .pop_front()
                            .ok_or_else(|| anyhow::anyhow!("missing value for --limit"))?
                            .parse()?;
                    }
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unknown option {other:?}"),
                }
            }

            let pool = open_pool(&database_path(database)).await?;

            let rows: Vec<SettingsRow> = sqlx::query_as(
                "SELECT id, latitude, longitude, radius, set_by, set_by_username, created_at
                 FROM global_location_settings
                 ORDER BY id DESC
                 LIMIT ?",
            )
            .bind(limit)
            .fetch_all(&pool)
            .await?;

            if rows.is_empty() {
                println!("no configuration history");
            }
            for row in rows {
                println!(
                    "#{:<4} {}  ({:.6}, {:.6})  r={} m  by {} ({})",
                    row.id,
                    row.created_at,
                    row.latitude,
                    row.longitude,
                    row.radius,
                    row.set_by_username,
                    row.set_by
                );
            }
            Ok(())
        }
        "stats" => {
            let mut database: Option<String> = None;
            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--database" => {
                        database = Some(
                            args.pop_front()
                                .ok_or_else(|| anyhow::anyhow!("missing value for --database"))?,
                        );
                    }
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unknown option {other:?}"),
                }
            }

            let pool = open_pool(&database_path(database)).await?;
            let ledger = SqliteCheckLedger::new(pool);

            let stats = ledger.stats(Utc::now()).await?;
            println!("Total checks: {}", stats.total);
            println!("Passed:       {}", stats.passed);
            println!("Pass rate:    {:.1}%", stats.pass_rate());
            println!("Last {}h:     {}", RECENT_WINDOW_HOURS, stats.recent_24h);
            Ok(())
        }
        "checks" => {
            let mut database: Option<String> = None;
            let mut limit: i64 = 20;
            let mut user: Option<i64> = None;
            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--database" => {
                        database = Some(
                            args.pop_front()
                                .ok_or_else(|| anyhow::anyhow!("missing value for --database"))?,
                        );
                    }
                    "--limit" => {
                        limit = args
                            .pop_front()
                            .ok_or_else(|| anyhow::anyhow!("missing value for --limit"))?
                            .parse()?;
                    }
                    "--user" => {
                        user = Some(
                            args.pop_front()
                                .ok_or_else(|| anyhow::anyhow!("missing value for --user"))?
                                .parse()?,
                        );
                    }
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unknown option {other:?}"),
                }
            }

            let pool = open_pool(&database_path(database)).await?;

            let rows: Vec<CheckRow> = match user {
                Some(user_id) => {
                    sqlx::query_as(
                        "SELECT id, user_id, username, latitude, longitude, is_in_range, checked_at
                         FROM user_checks
                         WHERE user_id = ?
                         ORDER BY id DESC
                         LIMIT ?",
                    )
                    .bind(user_id)
                    .bind(limit)
                    .fetch_all(&pool)
                    .await?
                }
                None => {
                    sqlx::query_as(
                        "SELECT id, user_id, username, latitude, longitude, is_in_range, checked_at
                         FROM user_checks
                         ORDER BY id DESC
                         LIMIT ?",
                    )
                    .bind(limit)
                    .fetch_all(&pool)
                    .await?
                }
            };

            if rows.is_empty() {
                println!("no checks recorded");
            }
            for row in rows {
                let outcome = if row.is_in_range { "in" } else { "out" };
                println!(
                    "#{:<4} {}  {} ({})  ({:.6}, {:.6})  {}",
                    row.id,
                    row.checked_at,
                    row.username,
                    row.user_id,
                    row.latitude,
                    row.longitude,
                    outcome
                );
            }
            Ok(())
        }
        other => {
            eprintln!("unknown command: {other}\n");
            print_help();
            anyhow::bail!("unknown command: {other}");
        }
    }
}
