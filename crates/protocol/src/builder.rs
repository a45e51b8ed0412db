//! Constructing transactions. Every builder validates its inputs before anything touches
//! the network.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use cosign_contracts::IERC20;
use cosign_primitives::{
    CosignError, OwnerAction, PendingTransactionRecord, Result, SafeTransaction, Wallet,
    normalize_address, to_base_units,
};

/// Decimals of the native currency.
pub const NATIVE_DECIMALS: u8 = 18;

/// What a transfer moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferAsset {
    Native,
    Erc20 { token: Address, decimals: u8 },
}

impl TransferAsset {
    pub fn decimals(&self) -> u8 {
        match self {
            Self::Native => NATIVE_DECIMALS,
            Self::Erc20 { decimals, .. } => *decimals,
        }
    }
}

fn check_nonce(wallet: &Wallet, nonce: u64) -> Result<()> {
    if wallet.is_nonce_consumed(nonce) {
        return Err(CosignError::NonceConsumed {
            nonce,
            current: wallet.nonce(),
        });
    }
    Ok(())
}

/// Builds a transfer of `amount` (a decimal string in whole units) to `recipient`.
pub fn build_transfer(
    wallet: &Wallet,
    asset: TransferAsset,
    recipient: &str,
    amount: &str,
    nonce: u64,
) -> Result<SafeTransaction> {
    let recipient = normalize_address(recipient)?;
    if recipient == Address::ZERO {
        return Err(CosignError::InvalidAddress(recipient.to_string()));
    }
    let amount = to_base_units(amount, asset.decimals())?;
    check_nonce(wallet, nonce)?;

    Ok(match asset {
        TransferAsset::Native => SafeTransaction::call(recipient, amount, Bytes::new(), nonce),
        TransferAsset::Erc20 { token, .. } => {
            let data = IERC20::transferCall { to: recipient, amount }.abi_encode();
            SafeTransaction::call(token, U256::ZERO, data, nonce)
        }
    })
}

/// Builds a self call applying `action` to the owner set.
pub fn build_owner_change(
    wallet: &Wallet,
    action: &OwnerAction,
    nonce: u64,
) -> Result<SafeTransaction> {
    let data = action.encode(wallet)?;
    check_nonce(wallet, nonce)?;
    Ok(SafeTransaction::call(wallet.address(), U256::ZERO, data, nonce))
}

/// Builds the zero-value self call that burns `nonce`. Once it executes, every other
/// transaction with the same nonce can never execute.
pub fn build_rejection(wallet: &Wallet, nonce: u64) -> Result<SafeTransaction> {
    check_nonce(wallet, nonce)?;
    Ok(SafeTransaction::call(
        wallet.address(),
        U256::ZERO,
        Bytes::new(),
        nonce,
    ))
}

/// Nonce for a new proposal: one past the highest queued nonce, never below the Safe's
/// current nonce.
pub fn next_nonce(wallet: &Wallet, pending: &[PendingTransactionRecord]) -> u64 {
    pending
        .iter()
        .filter(|record| !record.executed && record.safe == wallet.address())
        .map(|record| record.nonce().saturating_add(1))
        .fold(wallet.nonce(), u64::max)
}
