//! # Configuration
//!
//! One TOML file, loaded once at startup. Contract addresses default to
//! the placeholder (unset) value, so a fresh checkout fails fast with a
//! configuration error instead of calling contracts that do not exist.
//!
//! ```toml
//! [rpc]
//! url = "http://127.0.0.1:8545"
//!
//! [contracts]
//! token = "0x..."
//! nft = "0x..."
//! marketplace = "0x..."
//!
//! [proxy]
//! listen = "127.0.0.1:8080"
//!
//! [media]
//! proxy_base = "http://127.0.0.1:8080"
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use bazaar_chain::{ChainResult, ContractRegistry, HttpProvider};
use serde::Deserialize;
use thiserror::Error;

/// Configuration loading failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML for this schema.
    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// RPC endpoint settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RpcSection {
    /// JSON-RPC endpoint URL.
    pub url: String,
    /// Delay between receipt polls, milliseconds.
    pub receipt_poll_ms: u64,
    /// Total budget to wait for a receipt, milliseconds.
    pub receipt_timeout_ms: u64,
}

impl Default for RpcSection {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8545".to_string(),
            receipt_poll_ms: 1_000,
            receipt_timeout_ms: 120_000,
        }
    }
}

/// Image relay server settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ProxySection {
    /// Address the relay listens on.
    pub listen: SocketAddr,
}

impl Default for ProxySection {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

/// Deployed contract addresses; placeholders until deployment.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContractsSection {
    /// The ERC-20 payment token.
    pub token: String,
    /// The ERC-721 collection.
    pub nft: String,
    /// The marketplace escrow.
    pub marketplace: String,
}

/// Media resolution settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MediaSection {
    /// Relay origin that image fetches are routed through.
    pub proxy_base: String,
}

impl Default for MediaSection {
    fn default() -> Self {
        Self {
            proxy_base: "http://127.0.0.1:8080".to_string(),
        }
    }
}

/// The whole application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// RPC endpoint settings.
    pub rpc: RpcSection,
    /// Relay server settings.
    pub proxy: ProxySection,
    /// Deployed contract addresses.
    pub contracts: ContractsSection,
    /// Media resolution settings.
    pub media: MediaSection,
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Loads configuration, falling back to defaults when the file is
    /// missing. A present-but-broken file is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(toml::from_str(&text)?),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(error.into()),
        }
    }

    /// Builds the contract registry from the configured addresses.
    pub fn registry(&self) -> ChainResult<ContractRegistry> {
        ContractRegistry::from_strings(
            &self.contracts.token,
            &self.contracts.nft,
            &self.contracts.marketplace,
        )
    }

    /// Builds the JSON-RPC provider with the configured timing.
    #[must_use]
    pub fn provider(&self) -> HttpProvider {
        HttpProvider::new(self.rpc.url.clone())
            .with_receipt_poll(Duration::from_millis(self.rpc.receipt_poll_ms))
            .with_receipt_timeout(Duration::from_millis(self.rpc.receipt_timeout_ms))
    }
}
