//! # JSON-RPC Provider
//!
//! [`EthProvider`] over plain JSON-RPC/HTTP, for headless use against a
//! local or remote node. Account access maps to the node's unlocked
//! accounts (`eth_requestAccounts` where the endpoint supports it,
//! `eth_accounts` otherwise); a browser extension would answer the same
//! surface with a user prompt instead.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{hex, Address, B256, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{ChainError, ChainResult};
use crate::provider::{EthProvider, LogEntry, LogFilter, TxReceipt, TxRequest};

/// Default delay between receipt polls.
const DEFAULT_RECEIPT_POLL: Duration = Duration::from_secs(1);

/// Default budget for a transaction to mine before giving up.
const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    id: u64,
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize, Debug)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    id: Option<u64>,
    result: Option<Value>,
    error: Option<JsonRpcErrorDetail>,
}

#[derive(Deserialize, Debug)]
struct JsonRpcErrorDetail {
    #[allow(dead_code)]
    code: i64,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLog {
    address: String,
    topics: Vec<String>,
    data: String,
    block_number: Option<String>,
    transaction_hash: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: String,
    block_number: String,
    status: Option<String>,
    logs: Vec<RawLog>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlock {
    timestamp: String,
}

/// JSON-RPC/HTTP implementation of the provider seam.
pub struct HttpProvider {
    client: reqwest::Client,
    url: String,
    receipt_poll: Duration,
    receipt_timeout: Duration,
    next_id: AtomicU64,
}

impl HttpProvider {
    /// Creates a provider against `url` with default receipt timing.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            receipt_poll: DEFAULT_RECEIPT_POLL,
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
            next_id: AtomicU64::new(1),
        }
    }

    /// Sets the delay between receipt polls.
    #[must_use]
    pub fn with_receipt_poll(mut self, poll: Duration) -> Self {
        self.receipt_poll = poll;
        self
    }

    /// Sets the total budget to wait for a receipt.
    #[must_use]
    pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }

    /// Sends one JSON-RPC request and unwraps the result.
    ///
    /// Node-side errors (including revert reasons) pass through verbatim
    /// as [`ChainError::Execution`].
    async fn request(&self, method: &str, params: Value) -> ChainResult<Value> {
        let body = JsonRpcRequest {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            jsonrpc: "2.0",
            method,
            params,
        };
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;
        let parsed: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        if let Some(error) = parsed.error {
            return Err(ChainError::Execution {
                message: error.message,
            });
        }
        parsed
            .result
            .ok_or_else(|| ChainError::Transport(format!("{method}: empty response")))
    }

    async fn try_receipt(&self, tx_hash: B256) -> ChainResult<Option<TxReceipt>> {
        let result = self
            .request("eth_getTransactionReceipt", json!([tx_hash.to_string()]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        let raw: RawReceipt =
            serde_json::from_value(result).map_err(|e| ChainError::Decode(e.to_string()))?;
        Ok(Some(convert_receipt(raw)?))
    }
}

#[async_trait]
impl EthProvider for HttpProvider {
    async fn request_accounts(&self) -> ChainResult<Vec<Address>> {
        // Wallet endpoints prompt on eth_requestAccounts; bare nodes only
        // know eth_accounts.
        let result = match self.request("eth_requestAccounts", json!([])).await {
            Ok(value) => value,
            Err(ChainError::Execution { .. }) => {
                self.request("eth_accounts", json!([])).await?
            }
            Err(other) => return Err(other),
        };
        parse_addresses(&result)
    }

    async fn accounts(&self) -> ChainResult<Vec<Address>> {
        let result = self.request("eth_accounts", json!([])).await?;
        parse_addresses(&result)
    }

    async fn balance_of(&self, address: Address) -> ChainResult<U256> {
        let result = self
            .request("eth_getBalance", json!([address.to_string(), "latest"]))
            .await?;
        u256_from_hex(result.as_str().unwrap_or_default())
    }

    async fn call(&self, to: Address, data: Vec<u8>) -> ChainResult<Vec<u8>> {
        let result = self
            .request(
                "eth_call",
                json!([
                    { "to": to.to_string(), "data": hex_prefixed(&data) },
                    "latest"
                ]),
            )
            .await?;
        bytes_from_hex(result.as_str().unwrap_or_default())
    }

    async fn send_transaction(&self, tx: TxRequest) -> ChainResult<B256> {
        let result = self
            .request(
                "eth_sendTransaction",
                json!([{
                    "from": tx.from.to_string(),
                    "to": tx.to.to_string(),
                    "data": hex_prefixed(&tx.data),
                }]),
            )
            .await?;
        b256_from_hex(result.as_str().unwrap_or_default())
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> ChainResult<TxReceipt> {
        let deadline = tokio::time::Instant::now() + self.receipt_timeout;
        loop {
            if let Some(receipt) = self.try_receipt(tx_hash).await? {
                debug!(%tx_hash, block = receipt.block_number, "transaction mined");
                return Ok(receipt);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(ChainError::ReceiptTimeout {
                    tx_hash: tx_hash.to_string(),
                });
            }
            tokio::time::sleep(self.receipt_poll).await;
        }
    }

    async fn logs(&self, filter: LogFilter) -> ChainResult<Vec<LogEntry>> {
        let topics: Vec<Value> = match filter.event_signature {
            Some(sig) => vec![json!(sig.to_string())],
            None => Vec::new(),
        };
        let result = self
            .request(
                "eth_getLogs",
                json!([{
                    "address": filter.address.to_string(),
                    "fromBlock": format!("{:#x}", filter.from_block),
                    "toBlock": "latest",
                    "topics": topics,
                }]),
            )
            .await?;
        let raw: Vec<RawLog> =
            serde_json::from_value(result).map_err(|e| ChainError::Decode(e.to_string()))?;
        raw.into_iter().map(convert_log).collect()
    }

    async fn block_timestamp(&self, block_number: u64) -> ChainResult<u64> {
        let result = self
            .request(
                "eth_getBlockByNumber",
                json!([format!("{block_number:#x}"), false]),
            )
            .await?;
        let raw: RawBlock =
            serde_json::from_value(result).map_err(|e| ChainError::Decode(e.to_string()))?;
        u64_from_hex(&raw.timestamp)
    }
}

fn parse_addresses(value: &Value) -> ChainResult<Vec<Address>> {
    value
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(address_from_hex)
                .collect()
        })
        .unwrap_or_else(|| Err(ChainError::Decode("accounts: expected array".to_string())))
}

fn convert_receipt(raw: RawReceipt) -> ChainResult<TxReceipt> {
    Ok(TxReceipt {
        transaction_hash: b256_from_hex(&raw.transaction_hash)?,
        block_number: u64_from_hex(&raw.block_number)?,
        status: raw.status.as_deref() != Some("0x0"),
        logs: raw
            .logs
            .into_iter()
            .map(convert_log)
            .collect::<ChainResult<Vec<_>>>()?,
    })
}

fn convert_log(raw: RawLog) -> ChainResult<LogEntry> {
    Ok(LogEntry {
        address: address_from_hex(&raw.address)?,
        topics: raw
            .topics
            .iter()
            .map(|t| b256_from_hex(t))
            .collect::<ChainResult<Vec<_>>>()?,
        data: bytes_from_hex(&raw.data)?,
        block_number: raw
            .block_number
            .as_deref()
            .map_or(Ok(0), u64_from_hex)?,
        transaction_hash: raw
            .transaction_hash
            .as_deref()
            .map_or(Ok(B256::ZERO), b256_from_hex)?,
    })
}

fn hex_prefixed(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

fn address_from_hex(text: &str) -> ChainResult<Address> {
    Address::from_str(text).map_err(|_| ChainError::Decode(format!("bad address: {text}")))
}

fn b256_from_hex(text: &str) -> ChainResult<B256> {
    B256::from_str(text).map_err(|_| ChainError::Decode(format!("bad hash: {text}")))
}

fn bytes_from_hex(text: &str) -> ChainResult<Vec<u8>> {
    hex::decode(text).map_err(|_| ChainError::Decode(format!("bad hex data: {text}")))
}

fn u256_from_hex(text: &str) -> ChainResult<U256> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    U256::from_str_radix(digits, 16)
        .map_err(|_| ChainError::Decode(format!("bad quantity: {text}")))
}

fn u64_from_hex(text: &str) -> ChainResult<u64> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    u64::from_str_radix(digits, 16).map_err(|_| ChainError::Decode(format!("bad quantity: {text}")))
}
