//! Demo server exposing the sanitizer over HTTP.
//! Reads its configuration from the environment (and `.env`), then serves
//! the routes of `backend::router`.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use dotenv::dotenv;
use log::info;
use sanitize::backend::router::get_router;
use sanitize::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = Config::from_env()?;
    let sanitizer = config.build_sanitizer()?;
    let app = get_router(Arc::new(sanitizer), config.max_body_bytes);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to open web server listener on {}", addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to bind Axum to listener")?;

    Ok(())
}
