//! # Tolerant Event Decoding
//!
//! The exact ABI of the deployed marketplace is not under our control:
//! depending on the deployment, event arguments show up named and indexed
//! or purely positional. The decoders here accept a small closed set of
//! known shapes and fail closed - an unknown shape is skipped, never
//! guessed at.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolEvent;

use crate::contracts::{IMarketNft, IMarketplace};
use crate::provider::{LogEntry, TxReceipt};

/// What a decoded marketplace log describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarketEventKind {
    /// A listing was created.
    Listed,
    /// A listing was bought.
    Sold,
}

/// One decoded marketplace event, shape-independent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarketEvent {
    /// Listed or sold.
    pub kind: MarketEventKind,
    /// The token the event concerns.
    pub token_id: U256,
    /// Selling side.
    pub seller: Address,
    /// Buying/owning side (the marketplace itself on listing events).
    pub buyer: Address,
    /// Price in base units.
    pub price: U256,
    /// Block the event was emitted in.
    pub block_number: u64,
    /// Emitting transaction.
    pub transaction_hash: B256,
}

/// Decoded argument tuple shared by both marketplace events.
struct MarketArgs {
    token_id: U256,
    seller: Address,
    buyer: Address,
    price: U256,
}

/// Decodes one marketplace log, or returns `None` for unknown shapes.
#[must_use]
pub fn decode_market_log(log: &LogEntry) -> Option<MarketEvent> {
    let signature = *log.topics.first()?;

    let (kind, args) = if signature == IMarketplace::MarketItemCreated::SIGNATURE_HASH {
        let args = IMarketplace::MarketItemCreated::decode_raw_log(
            log.topics.iter().copied(),
            &log.data,
            true,
        )
        .map(|ev| MarketArgs {
            token_id: ev.tokenId,
            seller: ev.seller,
            buyer: ev.owner,
            price: ev.price,
        })
        .ok()
        .or_else(|| decode_positional(log))?;
        (MarketEventKind::Listed, args)
    } else if signature == IMarketplace::MarketItemSold::SIGNATURE_HASH {
        let args = IMarketplace::MarketItemSold::decode_raw_log(
            log.topics.iter().copied(),
            &log.data,
            true,
        )
        .map(|ev| MarketArgs {
            token_id: ev.tokenId,
            seller: ev.seller,
            buyer: ev.owner,
            price: ev.price,
        })
        .ok()
        .or_else(|| decode_positional(log))?;
        (MarketEventKind::Sold, args)
    } else {
        return None;
    };

    Some(MarketEvent {
        kind,
        token_id: args.token_id,
        seller: args.seller,
        buyer: args.buyer,
        price: args.price,
        block_number: log.block_number,
        transaction_hash: log.transaction_hash,
    })
}

/// Positional fallback: nothing indexed, all four arguments packed into
/// data words in declaration order.
fn decode_positional(log: &LogEntry) -> Option<MarketArgs> {
    // signature topic only + tokenId | seller | owner | price
    if log.topics.len() != 1 || log.data.len() < 128 {
        return None;
    }
    Some(MarketArgs {
        token_id: word_u256(&log.data, 0),
        seller: word_address(&log.data, 1),
        buyer: word_address(&log.data, 2),
        price: word_u256(&log.data, 3),
    })
}

/// Extracts the minted token id from a mint receipt.
///
/// Scans the receipt's logs for the collection's mint event, skipping
/// foreign or undecodable logs. `None` means the mint still succeeded -
/// only the id could not be recovered.
#[must_use]
pub fn minted_token_id(receipt: &TxReceipt, nft: Address) -> Option<U256> {
    receipt
        .logs
        .iter()
        .filter(|log| log.address == nft)
        .find_map(decode_minted)
}

/// Decodes one candidate mint log, or `None` to keep scanning.
fn decode_minted(log: &LogEntry) -> Option<U256> {
    if *log.topics.first()? != IMarketNft::NFTMinted::SIGNATURE_HASH {
        return None;
    }

    // Declared shape: minter indexed, tokenId and uri in data.
    if let Ok(ev) =
        IMarketNft::NFTMinted::decode_raw_log(log.topics.iter().copied(), &log.data, true)
    {
        return Some(ev.tokenId);
    }

    // Variant shape: minter and tokenId both indexed.
    if log.topics.len() >= 3 {
        return Some(U256::from_be_slice(log.topics[2].as_slice()));
    }

    // Last resort: tokenId as the first data word.
    if log.data.len() >= 32 {
        return Some(word_u256(&log.data, 0));
    }

    None
}

/// Reads the `index`-th 32-byte word as a [`U256`].
fn word_u256(data: &[u8], index: usize) -> U256 {
    let start = index * 32;
    U256::from_be_slice(&data[start..start + 32])
}

/// Reads the `index`-th 32-byte word as a right-aligned [`Address`].
fn word_address(data: &[u8], index: usize) -> Address {
    let start = index * 32;
    Address::from_slice(&data[start + 12..start + 32])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::SolValue;

    fn topic_u256(value: U256) -> B256 {
        B256::from(value.to_be_bytes::<32>())
    }

    fn base_log(topics: Vec<B256>, data: Vec<u8>) -> LogEntry {
        LogEntry {
            address: Address::repeat_byte(0xaa),
            topics,
            data,
            block_number: 7,
            transaction_hash: B256::repeat_byte(0x11),
        }
    }

    #[test]
    fn test_decodes_named_indexed_shape() {
        let seller = Address::repeat_byte(1);
        let owner = Address::repeat_byte(2);
        let price = U256::from(500u64);
        let log = base_log(
            vec![
                IMarketplace::MarketItemCreated::SIGNATURE_HASH,
                topic_u256(U256::from(42u64)),
            ],
            (seller, owner, price).abi_encode_params(),
        );

        let event = decode_market_log(&log).unwrap();
        assert_eq!(event.kind, MarketEventKind::Listed);
        assert_eq!(event.token_id, U256::from(42u64));
        assert_eq!(event.seller, seller);
        assert_eq!(event.buyer, owner);
        assert_eq!(event.price, price);
        assert_eq!(event.block_number, 7);
    }

    #[test]
    fn test_decodes_positional_shape() {
        let seller = Address::repeat_byte(3);
        let owner = Address::repeat_byte(4);
        let log = base_log(
            vec![IMarketplace::MarketItemSold::SIGNATURE_HASH],
            (U256::from(9u64), seller, owner, U256::from(1000u64)).abi_encode_params(),
        );

        let event = decode_market_log(&log).unwrap();
        assert_eq!(event.kind, MarketEventKind::Sold);
        assert_eq!(event.token_id, U256::from(9u64));
        assert_eq!(event.price, U256::from(1000u64));
    }

    #[test]
    fn test_unknown_shape_fails_closed() {
        // Right signature, but a truncated data section and no indexed id.
        let log = base_log(
            vec![IMarketplace::MarketItemCreated::SIGNATURE_HASH],
            vec![0u8; 64],
        );
        assert!(decode_market_log(&log).is_none());

        // Wrong signature entirely.
        let log = base_log(vec![B256::repeat_byte(0xff)], vec![0u8; 128]);
        assert!(decode_market_log(&log).is_none());
    }

    #[test]
    fn test_minted_id_from_declared_shape() {
        let nft = Address::repeat_byte(0xaa);
        let minter = Address::repeat_byte(5);
        let mut minter_topic = [0u8; 32];
        minter_topic[12..].copy_from_slice(minter.as_slice());
        let log = base_log(
            vec![
                IMarketNft::NFTMinted::SIGNATURE_HASH,
                B256::from(minter_topic),
            ],
            (U256::from(77u64), "ipfs://meta".to_string()).abi_encode_params(),
        );
        let receipt = TxReceipt {
            transaction_hash: B256::repeat_byte(0x22),
            block_number: 1,
            status: true,
            logs: vec![log],
        };

        assert_eq!(minted_token_id(&receipt, nft), Some(U256::from(77u64)));
    }

    #[test]
    fn test_minted_id_skips_foreign_logs() {
        let nft = Address::repeat_byte(0xaa);
        let foreign = LogEntry {
            address: Address::repeat_byte(0xbb),
            ..base_log(vec![IMarketNft::NFTMinted::SIGNATURE_HASH], vec![0u8; 64])
        };
        let undecodable = base_log(vec![B256::repeat_byte(0x01)], Vec::new());
        let receipt = TxReceipt {
            transaction_hash: B256::repeat_byte(0x22),
            block_number: 1,
            status: true,
            logs: vec![foreign, undecodable],
        };

        assert_eq!(minted_token_id(&receipt, nft), None);
    }
}
