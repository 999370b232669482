//! # Mint View
//!
//! Submit a metadata URI, mint, and - when the receipt cooperates - learn
//! the assigned token id for the "list it on the marketplace" hand-off.
//! A receipt without a recognizable mint event still counts as success,
//! just without the id.

use alloy_primitives::U256;
use bazaar_chain::{
    minted_token_id, ChainError, ChainResult, ContractName, ContractRegistry, NftContract,
    WalletAdapter,
};
use crossbeam_channel::Receiver;
use tracing::info;

use crate::status::StatusLine;
use crate::store::StateCell;

/// Mint page state.
#[derive(Clone, Debug, Default)]
pub struct MintState {
    /// Whether a mint is in flight (disables the form).
    pub busy: bool,
    /// Outcome of the last mint attempt.
    pub status: StatusLine,
    /// Token id extracted from the last successful mint, if any.
    pub minted_id: Option<U256>,
}

/// Controller for the mint page.
pub struct MintView {
    wallet: WalletAdapter,
    registry: ContractRegistry,
    state: StateCell<MintState>,
}

impl MintView {
    /// Creates the view.
    #[must_use]
    pub fn new(wallet: WalletAdapter, registry: ContractRegistry) -> Self {
        Self {
            wallet,
            registry,
            state: StateCell::default(),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> MintState {
        self.state.get()
    }

    /// Registers a state-change listener.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<()> {
        self.state.subscribe()
    }

    /// Mints a new token carrying `uri` to the caller.
    pub async fn mint(&self, uri: &str) {
        if let Err(error) = self.registry.address_of(ContractName::Nft) {
            self.state
                .update(|s| s.status = StatusLine::from_error(&error));
            return;
        }
        if uri.trim().is_empty() {
            self.state
                .update(|s| s.status = StatusLine::Error("a metadata URI is required".to_string()));
            return;
        }

        self.state.update(|s| {
            s.busy = true;
            s.status = StatusLine::Idle;
            s.minted_id = None;
        });

        let outcome = self.submit(uri.trim().to_string()).await;
        self.state.update(|s| {
            match outcome {
                Ok(minted) => {
                    s.minted_id = minted;
                    s.status = match minted {
                        Some(id) => {
                            info!(token_id = %id, "mint confirmed");
                            StatusLine::Success(format!("minted token #{id}"))
                        }
                        None => StatusLine::Success(
                            "minted (token id not found in the receipt)".to_string(),
                        ),
                    };
                }
                Err(error) => s.status = StatusLine::from_error(&error),
            }
            s.busy = false;
        });
    }

    async fn submit(&self, uri: String) -> ChainResult<Option<U256>> {
        let address = self.registry.address_of(ContractName::Nft)?;
        let signer = self.wallet.signer_for("mint").await?;
        let nft = NftContract::new(address, self.wallet.provider());

        let tx_hash = nft.mint(&signer, uri).await?;
        self.state
            .update(|s| s.status = StatusLine::Pending { tx_hash });

        let receipt = signer.confirm(tx_hash).await?;
        if !receipt.status {
            return Err(ChainError::Execution {
                message: format!("transaction {tx_hash} reverted"),
            });
        }
        Ok(minted_token_id(&receipt, address))
    }
}
