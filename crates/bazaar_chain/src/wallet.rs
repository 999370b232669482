//! # Wallet Adapter
//!
//! Thin wrapper over the injected provider: connect, silent account lookup,
//! signer acquisition and native balance reads.
//!
//! "No account" is a normal state here, not an error - only
//! [`WalletAdapter::signer_for`] turns it into one, because a
//! state-changing call cannot proceed without someone to sign it.

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};

use crate::error::{ChainError, ChainResult};
use crate::provider::{EthProvider, TxReceipt, TxRequest};

/// Wraps a wallet provider behind the small surface the views need.
#[derive(Clone)]
pub struct WalletAdapter {
    provider: Arc<dyn EthProvider>,
}

impl WalletAdapter {
    /// Wraps a provider.
    #[must_use]
    pub fn new(provider: Arc<dyn EthProvider>) -> Self {
        Self { provider }
    }

    /// Requests account access and returns the first authorized address.
    ///
    /// # Errors
    ///
    /// [`ChainError::NoProvider`] when no provider is injected,
    /// [`ChainError::ConnectionRejected`] when the user declines or the
    /// provider returns no accounts.
    pub async fn connect(&self) -> ChainResult<Address> {
        let accounts = self.provider.request_accounts().await?;
        accounts
            .first()
            .copied()
            .ok_or(ChainError::ConnectionRejected)
    }

    /// Silently looks up the active account.
    ///
    /// Returns `None` - never an error - when no wallet is connected.
    /// Callers must treat absence as an expected state.
    pub async fn current_account(&self) -> Option<Address> {
        match self.provider.accounts().await {
            Ok(accounts) => accounts.first().copied(),
            Err(_) => None,
        }
    }

    /// Obtains a signing handle bound to the active account.
    ///
    /// Required before any state-changing contract call. The `action`
    /// label names the user action in the error when no account is
    /// available.
    pub async fn signer_for(&self, action: &str) -> ChainResult<Signer> {
        let account = self
            .current_account()
            .await
            .ok_or_else(|| ChainError::NoAccount {
                action: action.to_string(),
            })?;
        Ok(Signer {
            account,
            provider: Arc::clone(&self.provider),
        })
    }

    /// Reads the native-currency balance of `address`.
    pub async fn balance_of(&self, address: Address) -> ChainResult<U256> {
        self.provider.balance_of(address).await
    }

    /// The underlying provider, for read-only contract handles.
    #[must_use]
    pub fn provider(&self) -> Arc<dyn EthProvider> {
        Arc::clone(&self.provider)
    }
}

/// A signing handle bound to one account.
///
/// Submission and confirmation are separate steps so callers can publish
/// the pending hash in between, the way every action flow does.
#[derive(Clone)]
pub struct Signer {
    account: Address,
    provider: Arc<dyn EthProvider>,
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl Signer {
    /// The account this handle signs as.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.account
    }

    /// Signs and submits a transaction; returns the pending hash.
    pub async fn send(&self, to: Address, data: Vec<u8>) -> ChainResult<B256> {
        self.provider
            .send_transaction(TxRequest {
                from: self.account,
                to,
                data,
            })
            .await
    }

    /// Awaits the receipt of a previously submitted transaction.
    pub async fn confirm(&self, tx_hash: B256) -> ChainResult<TxReceipt> {
        self.provider.wait_for_receipt(tx_hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockProvider;

    #[tokio::test]
    async fn test_connect_returns_first_account() {
        let provider = Arc::new(MockProvider::new().with_account(Address::repeat_byte(1)));
        let wallet = WalletAdapter::new(provider);
        assert_eq!(wallet.connect().await.unwrap(), Address::repeat_byte(1));
    }

    #[tokio::test]
    async fn test_connect_without_accounts_is_rejected() {
        let wallet = WalletAdapter::new(Arc::new(MockProvider::new()));
        assert_eq!(
            wallet.connect().await.unwrap_err(),
            ChainError::ConnectionRejected
        );
    }

    #[tokio::test]
    async fn test_current_account_is_silent_when_disconnected() {
        let wallet = WalletAdapter::new(Arc::new(MockProvider::new()));
        assert!(wallet.current_account().await.is_none());
    }

    #[tokio::test]
    async fn test_signer_requires_an_account() {
        let wallet = WalletAdapter::new(Arc::new(MockProvider::new()));
        let err = wallet.signer_for("list NFT").await.unwrap_err();
        assert_eq!(
            err,
            ChainError::NoAccount {
                action: "list NFT".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_signer_sends_from_bound_account() {
        let provider = Arc::new(MockProvider::new().with_account(Address::repeat_byte(3)));
        let wallet = WalletAdapter::new(Arc::clone(&provider) as Arc<dyn EthProvider>);
        let signer = wallet.signer_for("test").await.unwrap();
        signer
            .send(Address::repeat_byte(9), vec![1, 2, 3])
            .await
            .unwrap();
        let sent = provider.sent_transactions();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, Address::repeat_byte(3));
        assert_eq!(sent[0].to, Address::repeat_byte(9));
    }
}
