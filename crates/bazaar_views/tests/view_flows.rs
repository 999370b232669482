//! End-to-end controller flows over the scripted provider.
//!
//! Each test pins one of the behaviors the views guarantee: placeholder
//! config never costs a network call, local pre-checks fire before any
//! transaction, the allowance check is idempotent, reads work without a
//! wallet, and failure text passes through verbatim.

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{SolCall, SolEvent, SolValue};
use bazaar_chain::contracts::{ChainListing, IMarketNft, IMarketToken, IMarketplace};
use bazaar_chain::{
    parse_units, ContractRegistry, EthProvider, LogEntry, MockProvider, TxReceipt, WalletAdapter,
    PRICE_DECIMALS,
};
use bazaar_media::{Fetch, FetchError, ImageResolver};
use bazaar_views::{AirdropView, MarketView, MintView, StatusLine};

const TOKEN: Address = Address::repeat_byte(0x10);
const NFT: Address = Address::repeat_byte(0x20);
const MARKETPLACE: Address = Address::repeat_byte(0x30);
const ALICE: Address = Address::repeat_byte(0xa1);
const BOB: Address = Address::repeat_byte(0xb0);

/// Fetcher that always finds the same image; image behavior itself is
/// covered by the media crate's tests.
struct StubFetcher;

#[async_trait::async_trait]
impl Fetch for StubFetcher {
    async fn get_json(&self, _url: &str) -> Result<serde_json::Value, FetchError> {
        Ok(serde_json::json!({ "image": "https://host/art.png" }))
    }
}

fn resolver() -> Arc<ImageResolver> {
    Arc::new(ImageResolver::new(Arc::new(StubFetcher), ""))
}

fn full_registry() -> ContractRegistry {
    ContractRegistry::with_addresses(TOKEN, NFT, MARKETPLACE)
}

fn wallet(provider: &Arc<MockProvider>) -> WalletAdapter {
    WalletAdapter::new(Arc::clone(provider) as Arc<dyn EthProvider>)
}

fn market_view(provider: &Arc<MockProvider>, registry: ContractRegistry) -> MarketView {
    MarketView::new(wallet(provider), registry, resolver())
}

fn script_listings(provider: &MockProvider, listings: Vec<ChainListing>) {
    provider.set_response(
        MARKETPLACE,
        IMarketplace::getAllListingsCall::SELECTOR,
        IMarketplace::getAllListingsCall::abi_encode_returns(&(listings,)),
    );
}

fn script_token_uri(provider: &MockProvider) {
    provider.set_response(
        NFT,
        IMarketNft::tokenURICall::SELECTOR,
        IMarketNft::tokenURICall::abi_encode_returns(&("https://host/meta.json".to_string(),)),
    );
}

fn script_allowance(provider: &MockProvider, remaining: U256) {
    provider.set_response(
        TOKEN,
        IMarketToken::allowanceCall::SELECTOR,
        IMarketToken::allowanceCall::abi_encode_returns(&(remaining,)),
    );
}

fn selector_of(data: &[u8]) -> [u8; 4] {
    [data[0], data[1], data[2], data[3]]
}

// ============================================================================
// Placeholder configuration short-circuits
// ============================================================================

#[tokio::test]
async fn placeholder_token_address_blocks_airdrop_without_any_request() {
    let provider = Arc::new(MockProvider::new().with_account(ALICE));
    let view = AirdropView::new(wallet(&provider), ContractRegistry::default());

    view.request_airdrop().await;

    let state = view.state();
    assert!(state.status.is_error());
    assert!(state.status.to_string().contains("not configured"));
    assert_eq!(provider.request_count(), 0);
    assert!(provider.sent_transactions().is_empty());
}

#[tokio::test]
async fn placeholder_marketplace_blocks_listing_and_purchase_without_any_request() {
    let provider = Arc::new(MockProvider::new().with_account(ALICE));
    let view = market_view(&provider, ContractRegistry::default());

    view.set_sell_form("1", "5");
    view.submit_listing().await;
    assert!(view.state().status.is_error());
    assert_eq!(provider.request_count(), 0);

    view.buy_nft(U256::from(1u64), "5", BOB).await;
    assert!(view.state().status.is_error());
    assert_eq!(provider.request_count(), 0);
    assert!(provider.sent_transactions().is_empty());
}

// ============================================================================
// Local pre-checks
// ============================================================================

#[tokio::test]
async fn listing_an_unowned_token_is_rejected_before_any_request() {
    let provider = Arc::new(MockProvider::new().with_account(ALICE));
    let view = market_view(&provider, full_registry());

    // The cached owned set is empty: nothing was loaded.
    view.set_sell_form("5", "1");
    view.submit_listing().await;

    assert_eq!(
        view.state().status,
        StatusLine::Error("cannot list a token you do not own".to_string())
    );
    assert_eq!(provider.request_count(), 0);
    assert!(provider.sent_transactions().is_empty());
}

#[tokio::test]
async fn buying_your_own_listing_is_rejected_locally() {
    let provider = Arc::new(MockProvider::new().with_account(ALICE));
    let view = market_view(&provider, full_registry());
    view.load_data().await;

    let before = provider.request_count();
    view.buy_nft(U256::from(1u64), "5", ALICE).await;

    assert_eq!(
        view.state().status,
        StatusLine::Error("cannot buy your own NFT".to_string())
    );
    assert_eq!(provider.request_count(), before);
    assert!(provider.sent_transactions().is_empty());
}

// ============================================================================
// Allowance idempotence
// ============================================================================

#[tokio::test]
async fn sufficient_allowance_submits_no_approval() {
    let provider = Arc::new(MockProvider::new().with_account(ALICE));
    script_allowance(&provider, parse_units("10", PRICE_DECIMALS).unwrap());
    let view = market_view(&provider, full_registry());

    view.buy_nft(U256::from(1u64), "5", BOB).await;

    assert!(matches!(view.state().status, StatusLine::Success(_)));
    let sent = provider.sent_transactions();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        selector_of(&sent[0].data),
        IMarketplace::buyNFTCall::SELECTOR
    );
}

#[tokio::test]
async fn insufficient_allowance_approves_maximum_exactly_once_before_buying() {
    let provider = Arc::new(MockProvider::new().with_account(ALICE));
    script_allowance(&provider, U256::ZERO);
    let view = market_view(&provider, full_registry());

    view.buy_nft(U256::from(1u64), "5", BOB).await;

    let sent = provider.sent_transactions();
    assert_eq!(sent.len(), 2);

    let approve = IMarketToken::approveCall::abi_decode(&sent[0].data, true).unwrap();
    assert_eq!(approve.spender, MARKETPLACE);
    assert_eq!(approve.amount, U256::MAX);
    assert_eq!(
        selector_of(&sent[1].data),
        IMarketplace::buyNFTCall::SELECTOR
    );
}

// ============================================================================
// Operator approval on listing
// ============================================================================

async fn view_owning_token_three(provider: &Arc<MockProvider>) -> MarketView {
    provider.set_response(
        NFT,
        IMarketNft::balanceOfCall::SELECTOR,
        IMarketNft::balanceOfCall::abi_encode_returns(&(U256::from(1u64),)),
    );
    provider.set_response(
        NFT,
        IMarketNft::tokenOfOwnerByIndexCall::SELECTOR,
        IMarketNft::tokenOfOwnerByIndexCall::abi_encode_returns(&(U256::from(3u64),)),
    );
    script_token_uri(provider);
    script_listings(provider, Vec::new());

    let view = market_view(provider, full_registry());
    view.load_data().await;
    assert!(view.state().owns(U256::from(3u64)));
    view
}

#[tokio::test]
async fn listing_grants_operator_approval_when_missing() {
    let provider = Arc::new(MockProvider::new().with_account(ALICE));
    provider.set_response(
        NFT,
        IMarketNft::isApprovedForAllCall::SELECTOR,
        IMarketNft::isApprovedForAllCall::abi_encode_returns(&(false,)),
    );
    let view = view_owning_token_three(&provider).await;

    view.set_sell_form("3", "2");
    view.submit_listing().await;

    assert!(matches!(view.state().status, StatusLine::Success(_)));
    let sent = provider.sent_transactions();
    assert_eq!(sent.len(), 2);
    assert_eq!(
        selector_of(&sent[0].data),
        IMarketNft::setApprovalForAllCall::SELECTOR
    );
    assert_eq!(
        selector_of(&sent[1].data),
        IMarketplace::listNFTCall::SELECTOR
    );
    // The form clears on success.
    assert!(view.state().sell_form.token_id.is_empty());
}

#[tokio::test]
async fn listing_skips_operator_approval_when_already_granted() {
    let provider = Arc::new(MockProvider::new().with_account(ALICE));
    provider.set_response(
        NFT,
        IMarketNft::isApprovedForAllCall::SELECTOR,
        IMarketNft::isApprovedForAllCall::abi_encode_returns(&(true,)),
    );
    let view = view_owning_token_three(&provider).await;

    view.set_sell_form("3", "2");
    view.submit_listing().await;

    let sent = provider.sent_transactions();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        selector_of(&sent[0].data),
        IMarketplace::listNFTCall::SELECTOR
    );
}

// ============================================================================
// Wallet-less reads
// ============================================================================

#[tokio::test]
async fn unconnected_wallet_still_sees_listings() {
    let provider = Arc::new(MockProvider::new()); // no accounts at all
    script_listings(
        &provider,
        vec![ChainListing {
            tokenId: U256::from(1u64),
            seller: BOB,
            price: parse_units("5", PRICE_DECIMALS).unwrap(),
            active: true,
        }],
    );
    script_token_uri(&provider);
    let view = market_view(&provider, full_registry());

    view.load_data().await;

    let state = view.state();
    assert!(state.account.is_none());
    assert!(state.owned.is_empty());
    assert_eq!(state.listings.len(), 1);
    assert_eq!(state.listings[0].price, "5");
    assert!(state.listings[0].active);
    assert_eq!(state.active_listings().len(), 1);
}

// ============================================================================
// Airdrop
// ============================================================================

#[tokio::test]
async fn repeat_airdrop_claim_surfaces_the_contract_rejection_verbatim() {
    let provider = Arc::new(MockProvider::new().with_account(ALICE));
    let view = AirdropView::new(wallet(&provider), full_registry());

    view.request_airdrop().await;
    assert!(matches!(view.state().status, StatusLine::Success(_)));
    assert!(view.state().status.to_string().contains("1000"));

    // The contract alone decides eligibility; the UI must not pre-block.
    provider.fail_next_transaction("execution reverted: Airdrop: already claimed");
    view.request_airdrop().await;

    assert_eq!(
        view.state().status,
        StatusLine::Error("execution reverted: Airdrop: already claimed".to_string())
    );
    assert_eq!(provider.sent_transactions().len(), 2);
}

// ============================================================================
// Mint
// ============================================================================

#[tokio::test]
async fn mint_extracts_the_token_id_from_the_receipt() {
    let provider = Arc::new(MockProvider::new().with_account(ALICE));
    let mut minter_topic = [0u8; 32];
    minter_topic[12..].copy_from_slice(ALICE.as_slice());
    provider.queue_receipt(TxReceipt {
        transaction_hash: B256::repeat_byte(1),
        block_number: 5,
        status: true,
        logs: vec![LogEntry {
            address: NFT,
            topics: vec![
                IMarketNft::NFTMinted::SIGNATURE_HASH,
                B256::from(minter_topic),
            ],
            data: (U256::from(7u64), "ipfs://meta".to_string()).abi_encode_params(),
            block_number: 5,
            transaction_hash: B256::repeat_byte(1),
        }],
    });
    let view = MintView::new(wallet(&provider), full_registry());

    view.mint("ipfs://meta").await;

    let state = view.state();
    assert_eq!(state.minted_id, Some(U256::from(7u64)));
    assert!(state.status.to_string().contains("#7"));
}

#[tokio::test]
async fn mint_without_a_recognizable_event_still_succeeds() {
    let provider = Arc::new(MockProvider::new().with_account(ALICE));
    let view = MintView::new(wallet(&provider), full_registry());

    view.mint("ipfs://meta").await;

    let state = view.state();
    assert!(matches!(state.status, StatusLine::Success(_)));
    assert_eq!(state.minted_id, None);
}

#[tokio::test]
async fn mint_rejects_a_blank_uri_locally() {
    let provider = Arc::new(MockProvider::new().with_account(ALICE));
    let view = MintView::new(wallet(&provider), full_registry());

    view.mint("   ").await;

    assert!(view.state().status.is_error());
    assert_eq!(provider.request_count(), 0);
}

// ============================================================================
// History
// ============================================================================

fn market_log(signature: B256, token_id: u64, block_number: u64) -> LogEntry {
    let mut topic = [0u8; 32];
    topic[24..].copy_from_slice(&token_id.to_be_bytes());
    LogEntry {
        address: MARKETPLACE,
        topics: vec![signature, B256::from(topic)],
        data: (BOB, ALICE, parse_units("5", PRICE_DECIMALS).unwrap()).abi_encode_params(),
        block_number,
        transaction_hash: B256::repeat_byte(u8::try_from(block_number).unwrap_or(0)),
    }
}

#[tokio::test]
async fn history_merges_both_streams_sorted_newest_first() {
    let provider = Arc::new(MockProvider::new().with_account(ALICE));
    provider.set_logs(vec![
        market_log(IMarketplace::MarketItemCreated::SIGNATURE_HASH, 1, 1),
        market_log(IMarketplace::MarketItemSold::SIGNATURE_HASH, 1, 2),
        market_log(IMarketplace::MarketItemCreated::SIGNATURE_HASH, 1, 3),
        // A different token: must be filtered out.
        market_log(IMarketplace::MarketItemCreated::SIGNATURE_HASH, 9, 4),
    ]);
    provider.set_timestamp(1, 100);
    provider.set_timestamp(2, 300);
    provider.set_timestamp(3, 200);
    provider.set_timestamp(4, 400);
    let view = market_view(&provider, full_registry());

    let history = view.history(U256::from(1u64)).await.unwrap();

    let stamps: Vec<u64> = history.iter().map(|a| a.timestamp).collect();
    assert_eq!(stamps, vec![300, 200, 100]);
    assert!(history.iter().all(|a| a.price == "5"));
}

// ============================================================================
// Payment-token diagnostic
// ============================================================================

#[tokio::test]
async fn payment_token_mismatch_is_reported() {
    let other_token = Address::repeat_byte(0x77);
    let provider = Arc::new(MockProvider::new().with_account(ALICE));
    provider.set_response(
        MARKETPLACE,
        IMarketplace::paymentTokenCall::SELECTOR,
        IMarketplace::paymentTokenCall::abi_encode_returns(&(other_token,)),
    );
    provider.set_response(
        other_token,
        IMarketToken::balanceOfCall::SELECTOR,
        IMarketToken::balanceOfCall::abi_encode_returns(&(U256::ZERO,)),
    );
    let view = market_view(&provider, full_registry());

    let report = view.payment_token_report().await.unwrap();
    assert!(!report.matches());
    assert_eq!(report.configured, TOKEN);
    assert_eq!(report.actual, other_token);
    assert!(report.balance.is_zero());
}
