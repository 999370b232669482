//! # View Projections
//!
//! Transient read-through projections of chain state. Rebuilt on every
//! poll; never persisted; never authoritative.

use alloy_primitives::{Address, B256, U256};
use bazaar_chain::MarketEventKind;

/// One marketplace listing, formatted for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Listing {
    /// The listed token.
    pub token_id: U256,
    /// Who listed it.
    pub seller: Address,
    /// Price as a decimal display string.
    pub price: String,
    /// Whether the listing is still open.
    pub active: bool,
    /// Resolved display image, when resolution has run.
    pub image_url: Option<String>,
}

/// One token owned by the connected account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedNft {
    /// The owned token.
    pub token_id: U256,
    /// Resolved display image (a placeholder when resolution failed).
    pub image_url: String,
}

/// One row of a token's trading history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Activity {
    /// Listed or sold.
    pub kind: MarketEventKind,
    /// Price as a decimal display string.
    pub price: String,
    /// Selling side.
    pub from: Address,
    /// Buying side (the marketplace itself on listing rows).
    pub to: Address,
    /// Block timestamp, seconds.
    pub timestamp: u64,
    /// The emitting transaction, for explorer links.
    pub tx_hash: B256,
}
