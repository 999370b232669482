//! # Bazaar Views
//!
//! The page controllers and the two pieces of machinery every page shares:
//!
//! - [`store::StateCell`] - an explicit state container with subscriber
//!   notification (the non-reactive rendition of per-page component state)
//! - [`poll::Poller`] - a repeating scheduled task per view that re-runs
//!   discovery so the page stays fresh without manual refresh
//!
//! ## Control flow
//!
//! ```text
//! user action ──▶ controller ──▶ wallet adapter ──▶ contract handle
//!                     │                                   │
//!                     ▼                                   ▼
//!               StateCell update  ◀──── re-read ◀─── confirmation
//! ```
//!
//! Every controller catches failures at the action boundary and renders
//! them as a [`status::StatusLine`]; nothing here is fatal to the process.

pub mod airdrop;
pub mod home;
pub mod market;
pub mod mint;
pub mod poll;
pub mod status;
pub mod store;
pub mod types;

pub use airdrop::{AirdropState, AirdropView, AIRDROP_AMOUNT_TOKENS};
pub use home::{short_address, HomeState, HomeView};
pub use market::{MarketState, MarketView, PaymentTokenReport, SellForm};
pub use mint::{MintState, MintView};
pub use poll::{Poller, POLL_INTERVAL};
pub use status::StatusLine;
pub use store::StateCell;
pub use types::{Activity, Listing, OwnedNft};
