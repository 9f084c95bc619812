//! Binary entry point for the geofence verification bot.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    geofence_bot::server::run().await
}
