//! Main entry point for the Foodspot backend.
//!
//! Sets up logging, loads the configuration and hands over to
//! [`backend::start_server`].

use backend::{config::Config, start_server};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;
    start_server(config).await
}
