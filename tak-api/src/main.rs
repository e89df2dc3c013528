//! Tak game server binary.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tak_api::{router, AppStateInner, Config, SqliteStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_level())),
        )
        .init();

    let store = SqliteStore::open(&config.db_file)
        .with_context(|| format!("opening database {}", config.db_file.display()))?;
    let app = router(AppStateInner::new(store));

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("binding {}", config.listen))?;
    info!(address = %config.listen, "Tak API listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
