// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! Conversion between decimal strings and token base units.

use alloy::primitives::U256;

use super::client::ChainError;

/// Parse a human-readable amount to base units.
///
/// # Arguments
/// * `amount` - Amount as a string (e.g., "1.5")
/// * `decimals` - Number of decimals (18 for YD and ETH)
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, ChainError> {
    let amount = amount.trim();
    let (whole_str, frac_str) = match amount.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (amount, None),
    };

    if whole_str.is_empty() && frac_str.is_none_or(str::is_empty) {
        return Err(ChainError::InvalidAmount("empty amount".to_string()));
    }
    let is_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if !is_digits(whole_str) || !frac_str.is_none_or(is_digits) {
        return Err(ChainError::InvalidAmount(format!("invalid amount: {amount}")));
    }

    let whole = if whole_str.is_empty() {
        0u128
    } else {
        whole_str
            .parse::<u128>()
            .map_err(|_| ChainError::InvalidAmount(format!("invalid whole number: {amount}")))?
    };

    let decimal_part = match frac_str {
        Some(dec_str) => {
            if dec_str.len() > decimals as usize {
                return Err(ChainError::InvalidAmount(format!(
                    "too many decimal places (max {decimals})"
                )));
            }
            if dec_str.is_empty() {
                0u128
            } else {
                // Pad with zeros to match decimals
                let padded = format!("{:0<width$}", dec_str, width = decimals as usize);
                padded
                    .parse::<u128>()
                    .map_err(|_| ChainError::InvalidAmount(format!("invalid decimal: {amount}")))?
            }
        }
        None => 0u128,
    };

    let multiplier = 10u128
        .checked_pow(u32::from(decimals))
        .ok_or_else(|| ChainError::InvalidAmount("too many decimals".to_string()))?;
    let total = whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(decimal_part))
        .ok_or_else(|| ChainError::InvalidAmount("amount overflow".to_string()))?;

    Ok(U256::from(total))
}

/// Format base units to a full-precision decimal string.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    format_with_precision(amount, decimals, usize::MAX)
}

/// Format base units for display, truncated to 6 decimal places.
pub fn format_balance(amount: U256, decimals: u8) -> String {
    format_with_precision(amount, decimals, 6)
}

fn format_with_precision(amount: U256, decimals: u8, max_places: usize) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        return whole.to_string();
    }

    let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
    let trimmed = decimal_str.trim_end_matches('0');
    let shown: String = trimmed.chars().take(max_places).collect();
    if shown.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{shown}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_amount_whole() {
        let result = parse_amount("1", 18).unwrap();
        assert_eq!(result, U256::from(1_000_000_000_000_000_000u64));
    }

    #[test]
    fn parse_amount_decimal() {
        let result = parse_amount("1.5", 18).unwrap();
        assert_eq!(result, U256::from(1_500_000_000_000_000_000u64));

        let result = parse_amount(".25", 18).unwrap();
        assert_eq!(result, U256::from(250_000_000_000_000_000u64));
    }

    #[test]
    fn parse_amount_rejects_garbage() {
        assert!(parse_amount("", 18).is_err());
        assert!(parse_amount("1.2.3", 18).is_err());
        assert!(parse_amount("abc", 18).is_err());
        assert!(parse_amount("0.0000001", 6).is_err());
        assert!(parse_amount(".", 18).is_err());
    }

    #[test]
    fn parse_amount_rejects_signs() {
        assert!(parse_amount("1.+5", 18).is_err());
        assert!(parse_amount("+1", 18).is_err());
        assert!(parse_amount("-1", 18).is_err());
        assert!(parse_amount("1.-5", 18).is_err());
        assert!(parse_amount("1. 5", 18).is_err());
    }

    #[test]
    fn format_amount_full_precision() {
        let one = U256::from(1_000_000_000_000_000_000u64);
        assert_eq!(format_amount(one, 18), "1");

        let one_and_half = U256::from(1_500_000_000_000_000_000u64);
        assert_eq!(format_amount(one_and_half, 18), "1.5");

        let tiny = U256::from(1u64);
        assert_eq!(format_amount(tiny, 18), "0.000000000000000001");
    }

    #[test]
    fn format_balance_truncates_to_six_places() {
        let complex = U256::from(1_234_567_890_000_000_000u64);
        assert_eq!(format_balance(complex, 18), "1.234567");
        assert_eq!(format_balance(U256::ZERO, 18), "0");
        assert_eq!(format_balance(U256::from(1u64), 18), "0");
    }
}
