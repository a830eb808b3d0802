//! A backend relay that lets a browser client create Trello cards and attach files to them, without
//! exposing the Trello API credentials to the browser.

mod config;
pub(crate) mod percent_encoding;
mod plain_error_response;
mod relay;
mod trello;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::{config::Config, relay::Relay};

/// # Errors
///
/// See implementation.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let address = dotenvy::var("ADDRESS")?;
    let config = Config::from_env()?;

    if config.credentials().is_none() {
        tracing::warn!("`TRELLO_KEY` or `TRELLO_TOKEN` is unset, so every request will fail");
    }

    tracing::debug!(?config, "loaded config");
    tracing::info!("listening to {address}...");

    let listener = TcpListener::bind(address).await?;

    tracing::info!("ready!");

    axum::serve(listener, relay::router(Relay::new(config))).await?;

    Ok(())
}
