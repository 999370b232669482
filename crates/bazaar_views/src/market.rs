//! # Marketplace View
//!
//! The most stateful controller: listing discovery, ownership discovery,
//! listing creation, purchase, and per-token trading history.
//!
//! Reads are wallet-less - an unconnected visitor still sees listings;
//! only the owned set collapses to empty. Writes run the full sequence:
//! local pre-checks, signer, submit, pending hash, confirmation, full
//! reload.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolEvent;
use bazaar_chain::contracts::IMarketplace;
use bazaar_chain::{
    decode_market_log, format_units, parse_units, ChainError, ChainResult, ContractName,
    ContractRegistry, LogFilter, MarketplaceContract, NftContract, TokenContract, TxReceipt,
    WalletAdapter, MAX_ALLOWANCE, PRICE_DECIMALS,
};
use bazaar_media::ImageResolver;
use crossbeam_channel::Receiver;
use tracing::{debug, warn};

use crate::poll::{Poller, POLL_INTERVAL};
use crate::status::StatusLine;
use crate::store::StateCell;
use crate::types::{Activity, Listing, OwnedNft};

/// The sell-tab form fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SellForm {
    /// Token id, as typed.
    pub token_id: String,
    /// Price, as typed.
    pub price: String,
}

impl SellForm {
    fn is_complete(&self) -> bool {
        !self.token_id.trim().is_empty() && !self.price.trim().is_empty()
    }
}

/// Marketplace page state.
#[derive(Clone, Debug, Default)]
pub struct MarketState {
    /// The connected account, if any.
    pub account: Option<Address>,
    /// Every listing (active and inactive) for the collection.
    pub listings: Vec<Listing>,
    /// Tokens owned by the connected account.
    pub owned: Vec<OwnedNft>,
    /// The sell-tab form.
    pub sell_form: SellForm,
    /// Whether a write action is in flight (disables the buttons).
    pub busy: bool,
    /// Outcome of the last action.
    pub status: StatusLine,
}

impl MarketState {
    /// Listings currently open for purchase.
    #[must_use]
    pub fn active_listings(&self) -> Vec<&Listing> {
        self.listings.iter().filter(|l| l.active).collect()
    }

    /// True when the connected account owns `token_id` (per the cached
    /// projection - not re-verified on-chain).
    #[must_use]
    pub fn owns(&self, token_id: U256) -> bool {
        self.owned.iter().any(|nft| nft.token_id == token_id)
    }

    /// True when an owned token also has an open listing ("for sale"
    /// badge on the my-NFTs tab).
    #[must_use]
    pub fn is_for_sale(&self, token_id: U256) -> bool {
        self.listings
            .iter()
            .any(|l| l.token_id == token_id && l.active)
    }
}

/// Result of the payment-token diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentTokenReport {
    /// The token address the registry is configured with.
    pub configured: Address,
    /// The token the marketplace actually settles in.
    pub actual: Address,
    /// The caller's balance of the *actual* token.
    pub balance: U256,
}

impl PaymentTokenReport {
    /// True when configuration and deployment agree.
    #[must_use]
    pub fn matches(&self) -> bool {
        self.configured == self.actual
    }
}

/// Controller for the marketplace page.
pub struct MarketView {
    wallet: WalletAdapter,
    registry: ContractRegistry,
    resolver: Arc<ImageResolver>,
    state: StateCell<MarketState>,
}

impl MarketView {
    /// Creates the view.
    #[must_use]
    pub fn new(
        wallet: WalletAdapter,
        registry: ContractRegistry,
        resolver: Arc<ImageResolver>,
    ) -> Self {
        Self {
            wallet,
            registry,
            resolver,
            state: StateCell::default(),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> MarketState {
        self.state.get()
    }

    /// Registers a state-change listener.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<()> {
        self.state.subscribe()
    }

    /// Starts the page refresh loop: one load immediately, then every
    /// five seconds until the returned handle is dropped.
    #[must_use]
    pub fn start_polling(self: Arc<Self>) -> Poller {
        Poller::spawn(POLL_INTERVAL, move || {
            let view = Arc::clone(&self);
            async move { view.load_data().await }
        })
    }

    // ========================================================================
    // Discovery
    // ========================================================================

    /// Runs the full discovery sequence: account, ownership, listings.
    pub async fn load_data(&self) {
        self.load_account().await;
        self.load_owned().await;
        self.load_listings().await;
    }

    async fn load_account(&self) {
        let account = self.wallet.current_account().await;
        self.state.update(|s| s.account = account);
    }

    async fn load_owned(&self) {
        let Some(account) = self.state.get().account else {
            self.state.update(|s| s.owned.clear());
            return;
        };
        let Ok(nft_address) = self.registry.address_of(ContractName::Nft) else {
            self.state.update(|s| s.owned.clear());
            return;
        };

        // Any enumeration failure collapses to an empty set; ownership is
        // re-derived on the next poll anyway.
        let owned = match self.discover_owned(account, nft_address).await {
            Ok(owned) => owned,
            Err(error) => {
                debug!(%error, "ownership discovery failed");
                Vec::new()
            }
        };
        self.state.update(|s| s.owned = owned);
    }

    async fn discover_owned(
        &self,
        account: Address,
        nft_address: Address,
    ) -> ChainResult<Vec<OwnedNft>> {
        let nft = NftContract::new(nft_address, self.wallet.provider());
        let balance = nft.balance_of(account).await?;
        let count = usize::try_from(balance)
            .map_err(|_| ChainError::Decode("NFT balance out of range".to_string()))?;

        let mut token_ids = Vec::with_capacity(count);
        for index in 0..count {
            token_ids.push(
                nft.token_of_owner_by_index(account, U256::from(index))
                    .await?,
            );
        }

        let images = self.resolver.resolve_many(&nft, &token_ids).await;
        Ok(token_ids
            .into_iter()
            .zip(images)
            .map(|(token_id, image_url)| OwnedNft {
                token_id,
                image_url,
            })
            .collect())
    }

    async fn load_listings(&self) {
        let Ok(marketplace_address) = self.registry.address_of(ContractName::Marketplace) else {
            return;
        };
        let Ok(nft_address) = self.registry.address_of(ContractName::Nft) else {
            return;
        };

        match self
            .discover_listings(marketplace_address, nft_address)
            .await
        {
            Ok(listings) => self.state.update(|s| s.listings = listings),
            Err(error) => {
                debug!(%error, "listing discovery failed");
                self.state.update(|s| s.listings.clear());
            }
        }
    }

    async fn discover_listings(
        &self,
        marketplace_address: Address,
        nft_address: Address,
    ) -> ChainResult<Vec<Listing>> {
        let marketplace = MarketplaceContract::new(marketplace_address, self.wallet.provider());
        let nft = NftContract::new(nft_address, self.wallet.provider());

        let raw = marketplace.all_listings(nft_address).await?;
        let token_ids: Vec<U256> = raw.iter().map(|l| l.tokenId).collect();
        let images = self.resolver.resolve_many(&nft, &token_ids).await;

        Ok(raw
            .into_iter()
            .zip(images)
            .map(|(listing, image_url)| Listing {
                token_id: listing.tokenId,
                seller: listing.seller,
                price: format_units(listing.price, PRICE_DECIMALS),
                active: listing.active,
                image_url: Some(image_url),
            })
            .collect())
    }

    // ========================================================================
    // Listing creation
    // ========================================================================

    /// Fills the sell-tab form (the my-NFTs "sell" button does this).
    pub fn set_sell_form(&self, token_id: &str, price: &str) {
        self.state.update(|s| {
            s.sell_form = SellForm {
                token_id: token_id.to_string(),
                price: price.to_string(),
            };
        });
    }

    /// Submits the sell form as a new listing.
    ///
    /// Ownership is checked against the cached owned set before anything
    /// touches the network; the contract re-verifies on settlement.
    pub async fn submit_listing(&self) {
        if let Err(error) = self.registry.address_of(ContractName::Marketplace) {
            self.state
                .update(|s| s.status = StatusLine::from_error(&error));
            return;
        }

        let form = self.state.get().sell_form;
        if !form.is_complete() {
            self.state.update(|s| {
                s.status = StatusLine::Error("token id and price are required".to_string());
            });
            return;
        }
        let token_id = match U256::from_str_radix(form.token_id.trim(), 10) {
            Ok(id) => id,
            Err(_) => {
                self.state.update(|s| {
                    s.status =
                        StatusLine::Error(format!("not a token id: {}", form.token_id.trim()));
                });
                return;
            }
        };
        if !self.state.get().owns(token_id) {
            self.state.update(|s| {
                s.status = StatusLine::Error("cannot list a token you do not own".to_string());
            });
            return;
        }

        self.state.update(|s| {
            s.busy = true;
            s.status = StatusLine::Idle;
        });

        let outcome = self.create_listing(token_id, &form.price).await;
        let succeeded = outcome.is_ok();
        self.state.update(|s| {
            match outcome {
                Ok(()) => {
                    s.status = StatusLine::Success("listing created".to_string());
                    s.sell_form = SellForm::default();
                }
                Err(error) => s.status = StatusLine::from_error(&error),
            }
            s.busy = false;
        });

        if succeeded {
            self.load_data().await;
        }
    }

    async fn create_listing(&self, token_id: U256, price_text: &str) -> ChainResult<()> {
        let marketplace_address = self.registry.address_of(ContractName::Marketplace)?;
        let nft_address = self.registry.address_of(ContractName::Nft)?;
        let price = parse_units(price_text, PRICE_DECIMALS)?;

        let signer = self.wallet.signer_for("list NFT").await?;
        let nft = NftContract::new(nft_address, self.wallet.provider());
        let marketplace = MarketplaceContract::new(marketplace_address, self.wallet.provider());

        // Operator approval is a one-time grant; skip the transaction when
        // it is already in place.
        if !nft
            .is_approved_for_all(signer.address(), marketplace_address)
            .await?
        {
            let tx_hash = nft
                .set_approval_for_all(&signer, marketplace_address, true)
                .await?;
            self.state
                .update(|s| s.status = StatusLine::Pending { tx_hash });
            confirmed(&signer.confirm(tx_hash).await?)?;
        }

        let tx_hash = marketplace
            .list_nft(&signer, nft_address, token_id, price)
            .await?;
        self.state
            .update(|s| s.status = StatusLine::Pending { tx_hash });
        confirmed(&signer.confirm(tx_hash).await?)
    }

    // ========================================================================
    // Purchase
    // ========================================================================

    /// Buys the active listing for `token_id` at `price_text`.
    ///
    /// Self-purchase is rejected locally; the allowance check submits at
    /// most one (maximum) approval before the purchase itself.
    pub async fn buy_nft(&self, token_id: U256, price_text: &str, seller: Address) {
        if let Err(error) = self.registry.address_of(ContractName::Marketplace) {
            self.state
                .update(|s| s.status = StatusLine::from_error(&error));
            return;
        }
        if self.state.get().account == Some(seller) {
            self.state.update(|s| {
                s.status = StatusLine::Error("cannot buy your own NFT".to_string());
            });
            return;
        }

        self.state.update(|s| {
            s.busy = true;
            s.status = StatusLine::Idle;
        });

        let outcome = self.purchase(token_id, price_text).await;
        let succeeded = outcome.is_ok();
        self.state.update(|s| {
            s.status = match outcome {
                Ok(()) => StatusLine::Success(format!("bought token #{token_id}")),
                Err(error) => StatusLine::from_error(&error),
            };
            s.busy = false;
        });

        if succeeded {
            self.load_data().await;
        }
    }

    async fn purchase(&self, token_id: U256, price_text: &str) -> ChainResult<()> {
        let marketplace_address = self.registry.address_of(ContractName::Marketplace)?;
        let nft_address = self.registry.address_of(ContractName::Nft)?;
        let token_address = self.registry.address_of(ContractName::Token)?;
        let price = parse_units(price_text, PRICE_DECIMALS)?;

        let signer = self.wallet.signer_for("buy NFT").await?;
        let token = TokenContract::new(token_address, self.wallet.provider());

        let allowance = token.allowance(signer.address(), marketplace_address).await?;
        if allowance < price {
            // One-time maximum approval instead of one per purchase.
            let tx_hash = token
                .approve(&signer, marketplace_address, MAX_ALLOWANCE)
                .await?;
            self.state
                .update(|s| s.status = StatusLine::Pending { tx_hash });
            confirmed(&signer.confirm(tx_hash).await?)?;
        }

        let marketplace = MarketplaceContract::new(marketplace_address, self.wallet.provider());
        let tx_hash = marketplace.buy_nft(&signer, nft_address, token_id).await?;
        self.state
            .update(|s| s.status = StatusLine::Pending { tx_hash });
        confirmed(&signer.confirm(tx_hash).await?)
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Loads the trading history of one token, newest first.
    ///
    /// Queries both event streams unfiltered and filters after decoding -
    /// the tolerant decoder has to look at every log anyway, and not every
    /// deployed shape indexes the token id.
    pub async fn history(&self, token_id: U256) -> ChainResult<Vec<Activity>> {
        let marketplace_address = self.registry.address_of(ContractName::Marketplace)?;
        let provider = self.wallet.provider();

        let listed = provider
            .logs(LogFilter::event(
                marketplace_address,
                IMarketplace::MarketItemCreated::SIGNATURE_HASH,
            ))
            .await?;
        let sold = provider
            .logs(LogFilter::event(
                marketplace_address,
                IMarketplace::MarketItemSold::SIGNATURE_HASH,
            ))
            .await?;

        let mut activities = Vec::new();
        for log in listed.iter().chain(sold.iter()) {
            let Some(event) = decode_market_log(log) else {
                continue;
            };
            if event.token_id != token_id {
                continue;
            }
            let timestamp = provider.block_timestamp(event.block_number).await?;
            activities.push(Activity {
                kind: event.kind,
                price: format_units(event.price, PRICE_DECIMALS),
                from: event.seller,
                to: event.buyer,
                timestamp,
                tx_hash: event.transaction_hash,
            });
        }

        sort_descending(&mut activities);
        Ok(activities)
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Compares the configured payment token against what the marketplace
    /// actually settles in, and reads the caller's balance of the real
    /// token. Logged, never fatal.
    pub async fn payment_token_report(&self) -> ChainResult<PaymentTokenReport> {
        let marketplace_address = self.registry.address_of(ContractName::Marketplace)?;
        let configured = self.registry.address_of(ContractName::Token)?;
        let account = self
            .wallet
            .current_account()
            .await
            .ok_or_else(|| ChainError::NoAccount {
                action: "payment token diagnostics".to_string(),
            })?;

        let marketplace = MarketplaceContract::new(marketplace_address, self.wallet.provider());
        let actual = marketplace.payment_token().await?;
        let token = TokenContract::new(actual, self.wallet.provider());
        let balance = token.balance_of(account).await?;

        if configured != actual {
            warn!(%configured, %actual, "marketplace settles in a different token than configured");
        } else if balance.is_zero() {
            warn!(%account, "payment token balance is zero");
        }

        Ok(PaymentTokenReport {
            configured,
            actual,
            balance,
        })
    }
}

/// Sorts activities newest-first, regardless of input interleaving.
pub(crate) fn sort_descending(activities: &mut [Activity]) {
    activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Turns a failed receipt into the execution error callers expect.
fn confirmed(receipt: &TxReceipt) -> ChainResult<()> {
    if receipt.status {
        Ok(())
    } else {
        Err(ChainError::Execution {
            message: format!("transaction {} reverted", receipt.transaction_hash),
        })
    }
}
