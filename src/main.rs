//! LONAIRE catalog backend.
//!
//! Usage:
//!   DATABASE_URL=sqlite://lonaire.db lonaire --port 8000
//!
//! Without `DATABASE_URL` the service still starts: lists answer empty and
//! writes answer 503.

use anyhow::{Context, Result};
use clap::Parser;
use lonaire::{Catalog, Config, Database, Server, handlers};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let default_level = if config.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "LONAIRE API starting");
    let database = Database::connect(&config);
    let app = handlers::router(Catalog::new(database));

    let addr = config.listen_addr();
    Server::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?
        .serve(app)
        .await
        .context("server error")?;
    Ok(())
}
