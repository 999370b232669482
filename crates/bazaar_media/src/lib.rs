//! # Bazaar Media
//!
//! Image resolution for tokens: metadata URI → gateway rewrite → metadata
//! fetch through the relay → image URL, proxied.
//!
//! The single hard rule: **resolution never fails**. Malformed metadata,
//! unreachable hosts, non-JSON bodies - every failure degrades to a
//! placeholder URL so listing and ownership display are never blocked by
//! a broken image.

pub mod gateway;
pub mod metadata;
pub mod resolve;

pub use gateway::{proxied, to_http_url, DEFAULT_GATEWAY_HOST};
pub use metadata::TokenMetadata;
pub use resolve::{
    Fetch, FetchError, HttpFetcher, ImageResolver, PLACEHOLDER_ERROR, PLACEHOLDER_NO_IMAGE,
};
