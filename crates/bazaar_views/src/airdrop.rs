//! # Airdrop View
//!
//! One action: claim the one-time token grant. Whether an address may
//! still claim is decided entirely by the contract - there is no local
//! eligibility tracking, and a repeat claim simply surfaces the
//! contract's rejection text.

use alloy_primitives::B256;
use bazaar_chain::{
    ChainError, ChainResult, ContractName, ContractRegistry, TokenContract, WalletAdapter,
};
use crossbeam_channel::Receiver;
use tracing::info;

use crate::status::StatusLine;
use crate::store::StateCell;

/// The fixed grant, in whole tokens, shown on the page.
pub const AIRDROP_AMOUNT_TOKENS: u64 = 1000;

/// Airdrop page state.
#[derive(Clone, Debug, Default)]
pub struct AirdropState {
    /// Whether the claim is in flight (disables the button).
    pub busy: bool,
    /// Outcome of the last claim attempt.
    pub status: StatusLine,
}

/// Controller for the airdrop page.
pub struct AirdropView {
    wallet: WalletAdapter,
    registry: ContractRegistry,
    state: StateCell<AirdropState>,
}

impl AirdropView {
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
    pub fn state(&self) -> AirdropState {
        self.state.get()
    }

    /// Registers a state-change listener.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<()> {
        self.state.subscribe()
    }

    /// Requests the one-time token grant.
    ///
    /// A placeholder token address fails here, before any network call.
    pub async fn request_airdrop(&self) {
        // Config check first: a placeholder address must not cost a request.
        if let Err(error) = self.registry.address_of(ContractName::Token) {
            self.state
                .update(|s| s.status = StatusLine::from_error(&error));
            return;
        }

        self.state.update(|s| {
            s.busy = true;
            s.status = StatusLine::Idle;
        });

        let outcome = self.claim().await;
        self.state.update(|s| {
            s.status = match outcome {
                Ok(tx_hash) => {
                    info!(%tx_hash, "airdrop claimed");
                    StatusLine::Success(format!("received {AIRDROP_AMOUNT_TOKENS} tokens"))
                }
                Err(error) => StatusLine::from_error(&error),
            };
            s.busy = false;
        });
    }

    async fn claim(&self) -> ChainResult<B256> {
        let address = self.registry.address_of(ContractName::Token)?;
        let signer = self.wallet.signer_for("airdrop claim").await?;
        let token = TokenContract::new(address, self.wallet.provider());

        let tx_hash = token.request_airdrop(&signer).await?;
        self.state
            .update(|s| s.status = StatusLine::Pending { tx_hash });

        let receipt = signer.confirm(tx_hash).await?;
        if !receipt.status {
            return Err(ChainError::Execution {
                message: format!("transaction {tx_hash} reverted"),
            });
        }
        Ok(tx_hash)
    }
}
