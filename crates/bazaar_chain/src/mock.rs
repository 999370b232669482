//! # Scripted Mock Provider
//!
//! A deterministic stand-in for the wallet boundary. Tests script
//! per-selector call responses, queue transaction outcomes and receipts,
//! and then assert on what was actually sent - including that *nothing*
//! was sent, which several flows are required to guarantee.

use std::collections::{HashMap, VecDeque};

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{ChainError, ChainResult};
use crate::provider::{EthProvider, LogEntry, LogFilter, TxReceipt, TxRequest};

/// How `request_accounts` behaves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum ConnectBehavior {
    /// Return the configured accounts.
    #[default]
    Allow,
    /// Simulate a missing provider.
    NoProvider,
    /// Simulate the user declining the prompt.
    Reject,
}

#[derive(Default)]
struct MockState {
    accounts: Vec<Address>,
    connect: ConnectBehavior,
    balances: HashMap<Address, U256>,
    /// Repeatable responses keyed by (contract, selector).
    responses: HashMap<(Address, [u8; 4]), Vec<u8>>,
    /// One-shot responses, consumed before the repeatable ones.
    queued_responses: HashMap<(Address, [u8; 4]), VecDeque<Vec<u8>>>,
    sent: Vec<TxRequest>,
    /// One-shot submission failures (revert messages, verbatim).
    tx_failures: VecDeque<String>,
    /// One-shot receipts; a default success receipt is synthesized otherwise.
    receipts: VecDeque<TxReceipt>,
    logs: Vec<LogEntry>,
    timestamps: HashMap<u64, u64>,
    requests: u64,
    next_tx: u64,
}

/// Scripted wallet/provider double.
#[derive(Default)]
pub struct MockProvider {
    state: Mutex<MockState>,
}

impl MockProvider {
    /// Creates an empty, disconnected provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an authorized account (builder form).
    #[must_use]
    pub fn with_account(self, account: Address) -> Self {
        self.state.lock().accounts.push(account);
        self
    }

    /// Replaces the authorized account set.
    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.state.lock().accounts = accounts;
    }

    /// Makes `request_accounts` fail as if no provider were injected.
    pub fn remove_provider(&self) {
        self.state.lock().connect = ConnectBehavior::NoProvider;
    }

    /// Makes `request_accounts` fail as if the user declined.
    pub fn reject_connection(&self) {
        self.state.lock().connect = ConnectBehavior::Reject;
    }

    /// Sets a native-currency balance.
    pub fn set_balance(&self, address: Address, balance: U256) {
        self.state.lock().balances.insert(address, balance);
    }

    /// Scripts a repeatable return for calls to `(to, selector)`.
    pub fn set_response(&self, to: Address, selector: [u8; 4], ret: Vec<u8>) {
        self.state.lock().responses.insert((to, selector), ret);
    }

    /// Queues a one-shot return for `(to, selector)`, consumed before any
    /// repeatable response. Lets a read change between two polls.
    pub fn queue_response(&self, to: Address, selector: [u8; 4], ret: Vec<u8>) {
        self.state
            .lock()
            .queued_responses
            .entry((to, selector))
            .or_default()
            .push_back(ret);
    }

    /// Makes the next submitted transaction fail with `message`.
    ///
    /// The message is what the views must surface verbatim.
    pub fn fail_next_transaction(&self, message: impl Into<String>) {
        self.state.lock().tx_failures.push_back(message.into());
    }

    /// Queues the receipt returned by the next `wait_for_receipt`.
    pub fn queue_receipt(&self, receipt: TxReceipt) {
        self.state.lock().receipts.push_back(receipt);
    }

    /// Seeds the historical log store queried by `logs`.
    pub fn set_logs(&self, logs: Vec<LogEntry>) {
        self.state.lock().logs = logs;
    }

    /// Sets the timestamp reported for `block_number`.
    pub fn set_timestamp(&self, block_number: u64, timestamp: u64) {
        self.state.lock().timestamps.insert(block_number, timestamp);
    }

    /// Every transaction submitted so far, in order.
    #[must_use]
    pub fn sent_transactions(&self) -> Vec<TxRequest> {
        self.state.lock().sent.clone()
    }

    /// Total provider requests of any kind.
    ///
    /// The "zero network/chain calls" properties assert on this.
    #[must_use]
    pub fn request_count(&self) -> u64 {
        self.state.lock().requests
    }

    fn bump(&self) {
        self.state.lock().requests += 1;
    }
}

#[async_trait]
impl EthProvider for MockProvider {
    async fn request_accounts(&self) -> ChainResult<Vec<Address>> {
        self.bump();
        let state = self.state.lock();
        match state.connect {
            ConnectBehavior::Allow => Ok(state.accounts.clone()),
            ConnectBehavior::NoProvider => Err(ChainError::NoProvider),
            ConnectBehavior::Reject => Err(ChainError::ConnectionRejected),
        }
    }

    async fn accounts(&self) -> ChainResult<Vec<Address>> {
        self.bump();
        Ok(self.state.lock().accounts.clone())
    }

    async fn balance_of(&self, address: Address) -> ChainResult<U256> {
        self.bump();
        Ok(self
            .state
            .lock()
            .balances
            .get(&address)
            .copied()
            .unwrap_or(U256::ZERO))
    }

    async fn call(&self, to: Address, data: Vec<u8>) -> ChainResult<Vec<u8>> {
        self.bump();
        if data.len() < 4 {
            return Err(ChainError::Execution {
                message: "mock: calldata too short".to_string(),
            });
        }
        let selector = [data[0], data[1], data[2], data[3]];
        let mut state = self.state.lock();
        if let Some(queue) = state.queued_responses.get_mut(&(to, selector)) {
            if let Some(ret) = queue.pop_front() {
                return Ok(ret);
            }
        }
        state
            .responses
            .get(&(to, selector))
            .cloned()
            .ok_or_else(|| ChainError::Execution {
                message: format!("mock: no scripted response for selector {selector:02x?}"),
            })
    }

    async fn send_transaction(&self, tx: TxRequest) -> ChainResult<B256> {
        self.bump();
        let mut state = self.state.lock();
        state.sent.push(tx);
        if let Some(message) = state.tx_failures.pop_front() {
            return Err(ChainError::Execution { message });
        }
        state.next_tx += 1;
        Ok(B256::with_last_byte(u8::try_from(state.next_tx % 256).unwrap_or(0)))
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> ChainResult<TxReceipt> {
        self.bump();
        let mut state = self.state.lock();
        if let Some(receipt) = state.receipts.pop_front() {
            return Ok(receipt);
        }
        Ok(TxReceipt {
            transaction_hash: tx_hash,
            block_number: 1,
            status: true,
            logs: Vec::new(),
        })
    }

    async fn logs(&self, filter: LogFilter) -> ChainResult<Vec<LogEntry>> {
        self.bump();
        let state = self.state.lock();
        Ok(state
            .logs
            .iter()
            .filter(|log| log.address == filter.address)
            .filter(|log| log.block_number >= filter.from_block)
            .filter(|log| match filter.event_signature {
                Some(sig) => log.topics.first() == Some(&sig),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn block_timestamp(&self, block_number: u64) -> ChainResult<u64> {
        self.bump();
        self.state
            .lock()
            .timestamps
            .get(&block_number)
            .copied()
            .ok_or_else(|| ChainError::Execution {
                message: format!("mock: no timestamp for block {block_number}"),
            })
    }
}
