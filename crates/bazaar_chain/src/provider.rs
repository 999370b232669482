//! # Provider Seam
//!
//! The wallet/node boundary as an object-safe trait.
//!
//! The application never talks to a provider directly; views go through
//! [`crate::wallet::WalletAdapter`] and the typed contract handles, which in
//! turn call this trait. Implementations:
//!
//! - [`crate::rpc::HttpProvider`] - JSON-RPC over HTTP for headless use
//! - [`crate::mock::MockProvider`] - scripted double for tests

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::error::ChainResult;

/// A state-changing call waiting to be signed and submitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxRequest {
    /// Sending account.
    pub from: Address,
    /// Target contract.
    pub to: Address,
    /// ABI-encoded calldata.
    pub data: Vec<u8>,
}

/// A mined transaction receipt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    /// Hash of the mined transaction.
    pub transaction_hash: B256,
    /// Block the transaction was included in.
    pub block_number: u64,
    /// Whether execution succeeded.
    pub status: bool,
    /// Logs emitted during execution, in order.
    pub logs: Vec<LogEntry>,
}

/// A single emitted log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    /// Emitting contract.
    pub address: Address,
    /// Indexed topics (first is the event signature hash).
    pub topics: Vec<B256>,
    /// Non-indexed data words.
    pub data: Vec<u8>,
    /// Block the log was emitted in.
    pub block_number: u64,
    /// Transaction that emitted the log.
    pub transaction_hash: B256,
}

/// Filter for historical log queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogFilter {
    /// Emitting contract to match.
    pub address: Address,
    /// Event signature hash to match, if any.
    pub event_signature: Option<B256>,
    /// First block of the query range (inclusive).
    pub from_block: u64,
}

impl LogFilter {
    /// Builds a filter matching one event signature from genesis onward.
    #[must_use]
    pub fn event(address: Address, signature: B256) -> Self {
        Self {
            address,
            event_signature: Some(signature),
            from_block: 0,
        }
    }
}

/// The injected-provider surface this application consumes.
///
/// Mirrors the standard request/response wallet boundary: account access,
/// chain reads, transaction submission and log queries. Implementors decide
/// what "requesting access" means (a browser wallet prompts the user, a dev
/// node returns its unlocked accounts).
#[async_trait]
pub trait EthProvider: Send + Sync {
    /// Requests account access and returns the authorized accounts.
    async fn request_accounts(&self) -> ChainResult<Vec<Address>>;

    /// Returns the already-authorized accounts without prompting.
    ///
    /// An empty list is a normal state, not an error.
    async fn accounts(&self) -> ChainResult<Vec<Address>>;

    /// Reads the native-currency balance of an address.
    async fn balance_of(&self, address: Address) -> ChainResult<U256>;

    /// Executes a read-only contract call and returns the raw return data.
    async fn call(&self, to: Address, data: Vec<u8>) -> ChainResult<Vec<u8>>;

    /// Signs and submits a state-changing transaction.
    ///
    /// Returns the pending transaction hash.
    async fn send_transaction(&self, tx: TxRequest) -> ChainResult<B256>;

    /// Waits until the transaction is mined and returns its receipt.
    async fn wait_for_receipt(&self, tx_hash: B256) -> ChainResult<TxReceipt>;

    /// Queries historical logs.
    async fn logs(&self, filter: LogFilter) -> ChainResult<Vec<LogEntry>>;

    /// Returns the timestamp (seconds) of a block.
    async fn block_timestamp(&self, block_number: u64) -> ChainResult<u64>;
}
