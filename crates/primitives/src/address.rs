//! Address normalization. Everything that compares or stores owner addresses goes
//! through [`normalize_address`] first; display always uses the checksummed form.

use crate::error::{CosignError, Result};
use alloy_primitives::Address;

/// Parses a `0x`-prefixed 20-byte hex address.
///
/// All-lowercase and all-uppercase input is accepted as is. Mixed-case input must carry
/// a valid EIP-55 checksum, so a mistyped character is caught instead of silently
/// producing a different address.
pub fn normalize_address(input: &str) -> Result<Address> {
    let trimmed = input.trim();
    let invalid = || CosignError::InvalidAddress(input.to_string());

    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(invalid)?;
    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let has_lower = hex.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(format!("0x{hex}"), None).map_err(|_| invalid())
    } else {
        hex.parse().map_err(|_| invalid())
    }
}

/// EIP-55 checksummed form used for storage and display.
pub fn checksummed(address: &Address) -> String {
    address.to_checksum(None)
}

/// Serde adapter that writes checksummed addresses and reads through [`normalize_address`].
pub mod serde_checksummed {
    use alloy_primitives::Address;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::checksummed(address))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::normalize_address(&raw).map_err(D::Error::custom)
    }
}
