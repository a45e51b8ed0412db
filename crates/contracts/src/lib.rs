//! Contract bindings for the Safe multisig wallet and the ERC-20 calls cosign builds.

pub use alloy_sol_types::sol;

pub mod erc20;
pub mod safe;

pub use erc20::IERC20;
pub use safe::{IOwnerManager, ISafe, SENTINEL_OWNERS, SafeRevert};
