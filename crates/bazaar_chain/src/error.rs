//! # Chain Error Types
//!
//! All errors that can cross the contract boundary.

use thiserror::Error;

/// Errors raised by wallet access, configuration checks and contract calls.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// No wallet provider is available at all.
    #[error("no wallet provider is available")]
    NoProvider,

    /// The user rejected the connection request.
    #[error("wallet connection was rejected")]
    ConnectionRejected,

    /// A signing handle was requested but no account is connected.
    #[error("no connected account for action: {action}")]
    NoAccount {
        /// The user action that needed a signer.
        action: String,
    },

    /// A contract address is still at its placeholder value.
    ///
    /// Raised before any network call is made.
    #[error("contract address not configured: {name}")]
    NotConfigured {
        /// Logical contract name (TOKEN, NFT, MARKETPLACE).
        name: &'static str,
    },

    /// A call or transaction failed on-chain.
    ///
    /// The message is the provider's text, passed through verbatim.
    #[error("{message}")]
    Execution {
        /// The underlying failure message, unmodified.
        message: String,
    },

    /// The transport to the provider failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// A response could not be decoded against the expected ABI.
    #[error("abi decode error: {0}")]
    Decode(String),

    /// A transaction receipt did not arrive within the wait budget.
    #[error("timed out waiting for receipt of {tx_hash}")]
    ReceiptTimeout {
        /// The pending transaction hash.
        tx_hash: String,
    },

    /// A user-supplied value could not be parsed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;
