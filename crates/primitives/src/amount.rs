//! Decimal token amounts to integer base units and back.

use crate::error::{CosignError, Result};
use alloy_primitives::U256;

/// Largest decimals value whose scale factor fits in a `U256`.
pub const MAX_DECIMALS: u8 = 77;

fn scale(decimals: u8) -> Option<U256> {
    U256::from(10u64).checked_pow(U256::from(decimals))
}

/// Converts a non-negative decimal string such as `"12.5"` into base units.
///
/// Amounts that cannot be represented exactly with `decimals` digits are rejected rather
/// than truncated. Trailing fractional zeros are not significant.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<U256> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(CosignError::invalid_amount(amount, "amount is empty"));
    }
    if trimmed.starts_with('-') {
        return Err(CosignError::invalid_amount(amount, "amount must not be negative"));
    }
    if decimals > MAX_DECIMALS {
        return Err(CosignError::invalid_amount(
            amount,
            format!("token decimals {decimals} exceed {MAX_DECIMALS}"),
        ));
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty())
        || !is_digits(whole)
        || !is_digits(fraction)
        || (trimmed.contains('.') && fraction.is_empty())
    {
        return Err(CosignError::invalid_amount(amount, "not a decimal number"));
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(CosignError::invalid_amount(
            amount,
            format!("more than {decimals} fractional digits"),
        ));
    }

    let overflow = || CosignError::invalid_amount(amount, "amount is too large");
    let parse = |digits: &str| -> Result<U256> {
        if digits.is_empty() {
            return Ok(U256::ZERO);
        }
        U256::from_str_radix(digits, 10).map_err(|_| overflow())
    };

    let unit = scale(decimals).ok_or_else(overflow)?;
    let fraction_scale = scale(decimals - fraction.len() as u8).ok_or_else(overflow)?;
    let whole = parse(whole)?.checked_mul(unit).ok_or_else(overflow)?;
    let fraction = parse(fraction)? * fraction_scale;
    whole.checked_add(fraction).ok_or_else(overflow)
}

/// Formats base units as a decimal string without trailing fractional zeros.
pub fn from_base_units(amount: U256, decimals: u8) -> String {
    let (whole, fraction) = match scale(decimals) {
        Some(unit) => (amount / unit, amount % unit),
        // Every U256 is below 10^78, so the whole part is zero.
        None => (U256::ZERO, amount),
    };
    if fraction.is_zero() {
        return whole.to_string();
    }
    let fraction = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    format!("{whole}.{}", fraction.trim_end_matches('0'))
}
