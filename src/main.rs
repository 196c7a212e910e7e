use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dummydash::cache::{CacheBridge, MemoryCache, SqliteCache};
use dummydash::config::{Cli, Config};
use dummydash::gateway::DummyJsonGateway;
use dummydash::state::AppState;
use dummydash::sync::ResourceSync;
use dummydash::{build_router, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let config = Config::load(&cli)?;

    let cache: Arc<dyn CacheBridge> = if cli.ephemeral {
        tracing::info!("Ephemeral mode: snapshots are kept in memory");
        Arc::new(MemoryCache::new())
    } else {
        let data_dir = Config::data_dir(&cli)?;
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!("Data directory: {}", data_dir.display());

        let pool = db::create_pool(&config.db_path())?;
        db::run_migrations(&pool)?;
        Arc::new(SqliteCache::new(pool))
    };

    let gateway = DummyJsonGateway::new(&config.api.base_url, config.api.timeout())?;
    tracing::info!("Remote API: {}", config.api.base_url);

    let sync = ResourceSync::new(cache, Arc::new(gateway), config.api.limits);
    let state = AppState::new(config.clone(), sync);
    let app = build_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
