//! # Bazaar
//!
//! Client suite for a token-and-NFT marketplace backed by three externally
//! deployed contracts: an ERC-20 payment token (with a one-time airdrop
//! grant), an ERC-721 collection, and a peer-to-peer marketplace escrow.
//!
//! The contracts are the single source of truth. Everything in this
//! workspace is a read-through projection of chain state plus the glue to
//! submit user actions:
//!
//! - [`bazaar_chain`] - wallet adapter, contract registry, typed calls
//! - [`bazaar_media`] - gateway rewriting and image resolution
//! - [`bazaar_proxy`] - the CORS-bypassing image relay
//! - [`bazaar_views`] - the page controllers and polling
//!
//! This crate holds the TOML configuration and the binaries.

pub mod config;

pub use config::{AppConfig, ConfigError};
