//! # Home View
//!
//! Wallet connection and the connected-account header: silent account
//! restore on mount, explicit connect on click, native balance display.

use alloy_primitives::{Address, U256};
use bazaar_chain::WalletAdapter;
use crossbeam_channel::Receiver;
use tracing::debug;

use crate::status::StatusLine;
use crate::store::StateCell;

/// Home page state.
#[derive(Clone, Debug, Default)]
pub struct HomeState {
    /// The connected account, if any.
    pub account: Option<Address>,
    /// Native balance of the connected account.
    pub balance: Option<U256>,
    /// Whether a connect action is in flight (disables the button).
    pub busy: bool,
    /// Outcome of the last connect attempt.
    pub status: StatusLine,
}

/// Controller for the home page.
pub struct HomeView {
    wallet: WalletAdapter,
    state: StateCell<HomeState>,
}

impl HomeView {
    /// Creates the view over a wallet adapter.
    #[must_use]
    pub fn new(wallet: WalletAdapter) -> Self {
        Self {
            wallet,
            state: StateCell::default(),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> HomeState {
        self.state.get()
    }

    /// Registers a state-change listener.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<()> {
        self.state.subscribe()
    }

    /// Silent account restore, run on mount.
    ///
    /// No account is a normal state; the header just shows the connect
    /// button.
    pub async fn restore(&self) {
        let account = self.wallet.current_account().await;
        let balance = match account {
            Some(address) => self.wallet.balance_of(address).await.ok(),
            None => None,
        };
        self.state.update(|s| {
            s.account = account;
            s.balance = balance;
        });
    }

    /// Explicit connect, run on click.
    ///
    /// Wallet errors (no provider, user rejected) surface verbatim.
    pub async fn connect(&self) {
        self.state.update(|s| s.busy = true);
        match self.wallet.connect().await {
            Ok(account) => {
                debug!(%account, "wallet connected");
                let balance = self.wallet.balance_of(account).await.ok();
                self.state.update(|s| {
                    s.account = Some(account);
                    s.balance = balance;
                    s.status = StatusLine::Idle;
                    s.busy = false;
                });
            }
            Err(error) => {
                self.state.update(|s| {
                    s.status = StatusLine::from_error(&error);
                    s.busy = false;
                });
            }
        }
    }
}

/// Shortens an address for header display: `0x1234...abcd`.
#[must_use]
pub fn short_address(address: Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}
