//! # Price Units
//!
//! **NO FLOATING POINT NEAR MONEY.**
//!
//! Prices travel the wire as integer base units (10^-18 of a token) and are
//! converted to and from decimal display strings with pure integer
//! arithmetic. Same input, same output, on every machine.

use alloy_primitives::U256;

use crate::error::{ChainError, ChainResult};

/// Decimal places used by the payment token (standard ERC-20 precision).
pub const PRICE_DECIMALS: u32 = 18;

/// The one-time "approve forever" allowance.
///
/// Granting the maximum representable allowance once avoids an approval
/// transaction per purchase; the tradeoff (unlimited spend authorization
/// for the marketplace) is deliberate and documented.
pub const MAX_ALLOWANCE: U256 = U256::MAX;

/// Returns 10^`decimals` as a [`U256`].
fn scale(decimals: u32) -> U256 {
    U256::from(10u64).pow(U256::from(decimals))
}

/// Formats integer base units as a decimal display string.
///
/// Trailing fractional zeros are trimmed; whole values render without a
/// decimal point.
///
/// # Example
///
/// ```
/// use alloy_primitives::U256;
/// use bazaar_chain::units::{format_units, PRICE_DECIMALS};
///
/// let wei = U256::from(1_500_000_000_000_000_000u128);
/// assert_eq!(format_units(wei, PRICE_DECIMALS), "1.5");
/// ```
#[must_use]
pub fn format_units(value: U256, decimals: u32) -> String {
    let scale = scale(decimals);
    let whole = value / scale;
    let frac = value % scale;

    if frac.is_zero() {
        return whole.to_string();
    }

    let mut frac_digits = frac.to_string();
    while frac_digits.len() < decimals as usize {
        frac_digits.insert(0, '0');
    }
    while frac_digits.ends_with('0') {
        frac_digits.pop();
    }
    format!("{whole}.{frac_digits}")
}

/// Parses a decimal display string into integer base units.
///
/// Accepts an optional single decimal point; the fractional part may not
/// exceed `decimals` digits. Anything else is rejected before it can reach
/// a contract call.
pub fn parse_units(text: &str, decimals: u32) -> ChainResult<U256> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ChainError::InvalidInput("empty amount".to_string()));
    }

    let (whole_part, frac_part) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };

    if frac_part.contains('.') {
        return Err(ChainError::InvalidInput(format!(
            "malformed amount: {text}"
        )));
    }
    if frac_part.len() > decimals as usize {
        return Err(ChainError::InvalidInput(format!(
            "too many decimal places: {text}"
        )));
    }

    let whole = parse_digits(if whole_part.is_empty() { "0" } else { whole_part })?;
    // Right-pad the fraction to full precision: "5" at 18 decimals is 5 * 10^17.
    let frac = if frac_part.is_empty() {
        U256::ZERO
    } else {
        let padding = decimals as usize - frac_part.len();
        parse_digits(frac_part)? * scale(padding as u32)
    };

    whole
        .checked_mul(scale(decimals))
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| ChainError::InvalidInput(format!("amount out of range: {text}")))
}

/// Parses a plain run of ASCII digits.
fn parse_digits(digits: &str) -> ChainResult<U256> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ChainError::InvalidInput(format!(
            "not a decimal number: {digits}"
        )));
    }
    U256::from_str_radix(digits, 10)
        .map_err(|_| ChainError::InvalidInput(format!("amount out of range: {digits}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_whole_values() {
        assert_eq!(format_units(U256::ZERO, PRICE_DECIMALS), "0");
        let hundred = U256::from(100u64) * scale(PRICE_DECIMALS);
        assert_eq!(format_units(hundred, PRICE_DECIMALS), "100");
    }

    #[test]
    fn test_format_trims_trailing_zeros() {
        let value = U256::from(1_230_000_000_000_000_000u128);
        assert_eq!(format_units(value, PRICE_DECIMALS), "1.23");
    }

    #[test]
    fn test_format_keeps_leading_fraction_zeros() {
        let value = U256::from(1_000_000_000_000_000u128); // 0.001
        assert_eq!(format_units(value, PRICE_DECIMALS), "0.001");
    }

    #[test]
    fn test_parse_round_trips_display_strings() {
        for text in ["1.5", "100", "0.001", "42.000000000000000001"] {
            let units = parse_units(text, PRICE_DECIMALS).unwrap();
            assert_eq!(format_units(units, PRICE_DECIMALS), text);
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_units("", PRICE_DECIMALS).is_err());
        assert!(parse_units("abc", PRICE_DECIMALS).is_err());
        assert!(parse_units("1.2.3", PRICE_DECIMALS).is_err());
        assert!(parse_units("-5", PRICE_DECIMALS).is_err());
    }

    #[test]
    fn test_parse_rejects_excess_precision() {
        let too_precise = "0.0000000000000000001"; // 19 places
        assert!(parse_units(too_precise, PRICE_DECIMALS).is_err());
    }

    #[test]
    fn test_bare_fraction_parses() {
        let half = parse_units(".5", PRICE_DECIMALS).unwrap();
        assert_eq!(format_units(half, PRICE_DECIMALS), "0.5");
    }
}
