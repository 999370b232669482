//! Headless marketplace monitor.
//!
//! Runs the marketplace view's discovery loop read-only against the
//! configured RPC endpoint and logs every refresh. Useful for watching a
//! deployment without a browser, and for verifying that listings render
//! with no wallet connected.
//!
//! ```text
//! market_watch [config.toml]
//! ```

use std::sync::Arc;

use bazaar::AppConfig;
use bazaar_chain::WalletAdapter;
use bazaar_media::{HttpFetcher, ImageResolver};
use bazaar_views::{short_address, MarketView};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "bazaar.toml".to_string());
    let config = AppConfig::load_or_default(&config_path)?;

    let wallet = WalletAdapter::new(Arc::new(config.provider()));
    let registry = config.registry()?;
    let resolver = Arc::new(ImageResolver::new(
        Arc::new(HttpFetcher::new()),
        config.media.proxy_base.clone(),
    ));
    let view = Arc::new(MarketView::new(wallet, registry, resolver));

    let updates = view.subscribe();
    let reader = Arc::clone(&view);
    tokio::task::spawn_blocking(move || {
        while updates.recv().is_ok() {
            let state = reader.state();
            info!(
                account = %state.account.map(short_address).unwrap_or_else(|| "-".to_string()),
                listings = state.listings.len(),
                active = state.active_listings().len(),
                owned = state.owned.len(),
                "marketplace state refreshed"
            );
        }
    });

    info!(rpc = %config.rpc.url, "watching the marketplace; ctrl-c to stop");
    let poller = Arc::clone(&view).start_polling();

    tokio::signal::ctrl_c().await?;
    poller.stop();
    info!("shutting down");
    Ok(())
}
