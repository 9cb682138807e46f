//! Arena - authoritative game server binary

use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Arena Server v{}", env!("CARGO_PKG_VERSION"));

    let config = server::Config::load()?;
    info!("Loaded configuration");
    info!("  Port: {}", config.server.port);
    info!("  World: {0}x{0}", config.world.size);
    info!("  Tick rate: {}/s", config.server.tick_rate);
    info!("  Food: {}, bots: {}", config.world.food_count, config.world.bot_count);
    if let Some(seed) = config.world.seed {
        info!("  Seed: {}", seed);
    }

    server::run(config).await?;

    Ok(())
}
