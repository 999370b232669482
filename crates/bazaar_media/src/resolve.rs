//! # Image Resolution
//!
//! Turns a token id into a displayable image URL:
//!
//! ```text
//! tokenURI ─▶ gateway rewrite ─▶ metadata fetch (via relay) ─▶ image field
//!    │               │                    │                        │
//!    ▼ failure       ▼                    ▼ failure                ▼ missing
//! error placeholder  -          relay the URI itself as the   no-image
//!                               image (it may BE an image)    placeholder
//! ```
//!
//! Any failure at any stage degrades to a placeholder; callers never see an
//! error from this module.

use std::sync::Arc;

use alloy_primitives::U256;
use async_trait::async_trait;
use bazaar_chain::NftContract;
use futures::future::join_all;
use thiserror::Error;
use tracing::debug;

use crate::gateway::{proxied, to_http_url};
use crate::metadata::TokenMetadata;

/// Placeholder shown when a token has metadata but no image field.
pub const PLACEHOLDER_NO_IMAGE: &str = "https://via.placeholder.com/200?text=No+Image";

/// Placeholder shown when the token URI itself cannot be read.
pub const PLACEHOLDER_ERROR: &str = "https://via.placeholder.com/200?text=Error";

/// Fetch failures, internal to the resolver (they never escape it).
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request could not be made or completed.
    #[error("http error: {0}")]
    Http(String),
    /// The upstream answered with a non-success status.
    #[error("upstream returned status {0}")]
    Status(u16),
    /// The body was not JSON.
    #[error("body is not json: {0}")]
    NotJson(String),
}

/// The metadata-fetch seam, mockable in tests.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetches `url` and parses the body as JSON.
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, FetchError>;
}

/// [`Fetch`] over a shared reqwest client.
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with its own connection pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fetcher sharing an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }
        response
            .json()
            .await
            .map_err(|e| FetchError::NotJson(e.to_string()))
    }
}

/// Resolves token ids to displayable, relay-routed image URLs.
pub struct ImageResolver {
    fetcher: Arc<dyn Fetch>,
    proxy_base: String,
}

impl ImageResolver {
    /// Creates a resolver routing fetches through `proxy_base`.
    ///
    /// An empty base produces same-origin `/api/proxy?...` URLs.
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetch>, proxy_base: impl Into<String>) -> Self {
        Self {
            fetcher,
            proxy_base: proxy_base.into(),
        }
    }

    /// Resolves the display image URL for one token. Never fails.
    pub async fn resolve(&self, nft: &NftContract, token_id: U256) -> String {
        let token_uri = match nft.token_uri(token_id).await {
            Ok(uri) => uri,
            Err(e) => {
                debug!(%token_id, error = %e, "tokenURI read failed");
                return PLACEHOLDER_ERROR.to_string();
            }
        };

        let metadata_url = to_http_url(&token_uri);
        let proxied_metadata = proxied(&self.proxy_base, &metadata_url);

        let value = match self.fetcher.get_json(&proxied_metadata).await {
            Ok(value) => value,
            Err(e) => {
                // The URI may point straight at an image rather than a
                // metadata document; hand the relayed URI to the renderer.
                debug!(%token_id, error = %e, "metadata fetch failed, relaying the URI");
                return proxied_metadata;
            }
        };

        let metadata: TokenMetadata = serde_json::from_value(value).unwrap_or_default();
        match metadata.image_source() {
            Some(image) => proxied(&self.proxy_base, &to_http_url(image)),
            None => PLACEHOLDER_NO_IMAGE.to_string(),
        }
    }

    /// Resolves a whole token list, concurrently, preserving order.
    pub async fn resolve_many(&self, nft: &NftContract, token_ids: &[U256]) -> Vec<String> {
        join_all(token_ids.iter().map(|id| self.resolve(nft, *id))).await
    }
}
