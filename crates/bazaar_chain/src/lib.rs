//! # Bazaar Chain Boundary
//!
//! Everything that touches the wallet provider or a deployed contract
//! goes through this crate.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐   eth_call / eth_sendTransaction   ┌──────────────┐
//! │ Typed handles   │ ─────────────────────────────────▶ │ EthProvider  │
//! │ (Token/Nft/     │                                    │ (trait seam) │
//! │  Marketplace)   │ ◀───────────────────────────────── │              │
//! └────────┬────────┘          receipts / logs           └──────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Tolerant event  │
//! │ decoding        │
//! └─────────────────┘
//! ```
//!
//! The contracts themselves are external and authoritative; this crate only
//! invokes documented entry points and reads documented events.

pub mod contracts;
pub mod error;
pub mod events;
pub mod mock;
pub mod provider;
pub mod registry;
pub mod rpc;
pub mod units;
pub mod wallet;

pub use contracts::{MarketplaceContract, NftContract, TokenContract};
pub use error::{ChainError, ChainResult};
pub use events::{decode_market_log, minted_token_id, MarketEvent, MarketEventKind};
pub use mock::MockProvider;
pub use provider::{EthProvider, LogEntry, LogFilter, TxReceipt, TxRequest};
pub use registry::{ContractName, ContractRegistry};
pub use rpc::HttpProvider;
pub use units::{format_units, parse_units, MAX_ALLOWANCE, PRICE_DECIMALS};
pub use wallet::{Signer, WalletAdapter};
