//! Serves the image relay.
//!
//! ```text
//! proxy_server [config.toml]
//! ```

use bazaar::AppConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "bazaar.toml".to_string());
    let config = AppConfig::load_or_default(&config_path)?;

    let listener = tokio::net::TcpListener::bind(config.proxy.listen).await?;
    info!(listen = %config.proxy.listen, "image relay listening");

    axum::serve(listener, bazaar_proxy::router()).await?;
    Ok(())
}
