//! # Contract Registry
//!
//! Static mapping of logical contract names to deployed addresses.
//!
//! Deployments rotate on test networks, so addresses arrive through config
//! rather than being baked in. An address still at its placeholder value
//! short-circuits calling code with [`ChainError::NotConfigured`] before any
//! network call goes out.

use std::str::FromStr;

use alloy_primitives::Address;

use crate::error::{ChainError, ChainResult};

/// Logical names of the three deployed contracts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContractName {
    /// The ERC-20 payment token (also carries the airdrop entry point).
    Token,
    /// The ERC-721 collection.
    Nft,
    /// The peer-to-peer marketplace.
    Marketplace,
}

impl ContractName {
    /// The name as it appears in configuration and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Token => "TOKEN",
            Self::Nft => "NFT",
            Self::Marketplace => "MARKETPLACE",
        }
    }
}

/// Deployed addresses for the contract set.
///
/// Built from configuration strings; `""`, `"0x..."` (the scaffold
/// placeholder) and the zero address all count as "not configured".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractRegistry {
    token: Option<Address>,
    nft: Option<Address>,
    marketplace: Option<Address>,
}

impl ContractRegistry {
    /// Builds a registry from configured address strings.
    ///
    /// Placeholder values are tolerated and recorded as unconfigured; a
    /// present-but-malformed address is an error, since silently ignoring a
    /// typo would look exactly like a missing deployment.
    pub fn from_strings(token: &str, nft: &str, marketplace: &str) -> ChainResult<Self> {
        Ok(Self {
            token: parse_configured(token)?,
            nft: parse_configured(nft)?,
            marketplace: parse_configured(marketplace)?,
        })
    }

    /// Builds a registry directly from addresses (used by tests).
    #[must_use]
    pub fn with_addresses(token: Address, nft: Address, marketplace: Address) -> Self {
        Self {
            token: configured(token),
            nft: configured(nft),
            marketplace: configured(marketplace),
        }
    }

    /// Returns the deployed address for `name`.
    ///
    /// # Errors
    ///
    /// [`ChainError::NotConfigured`] when the address is still a
    /// placeholder. Callers must check this before acquiring a signer or
    /// issuing any network call.
    pub fn address_of(&self, name: ContractName) -> ChainResult<Address> {
        let slot = match name {
            ContractName::Token => self.token,
            ContractName::Nft => self.nft,
            ContractName::Marketplace => self.marketplace,
        };
        slot.ok_or(ChainError::NotConfigured {
            name: name.as_str(),
        })
    }

    /// Returns true if `name` has a real deployed address.
    #[must_use]
    pub fn is_configured(&self, name: ContractName) -> bool {
        self.address_of(name).is_ok()
    }
}

/// Treats the zero address as "not configured".
fn configured(address: Address) -> Option<Address> {
    (address != Address::ZERO).then_some(address)
}

/// Parses one configured address string, mapping placeholders to `None`.
fn parse_configured(text: &str) -> ChainResult<Option<Address>> {
    let text = text.trim();
    if text.is_empty() || text == "0x..." {
        return Ok(None);
    }
    let address = Address::from_str(text)
        .map_err(|_| ChainError::InvalidInput(format!("malformed contract address: {text}")))?;
    Ok(configured(address))
}
