//! Canonical Safe transaction hash: EIP-712 over the transaction fields with the Safe
//! as verifying contract. Every approver recomputes this independently before signing
//! or executing.

use crate::{transaction::SafeTransaction, wallet::SafeDomain};
use alloy_dyn_abi::TypedData;
use alloy_primitives::{B256, U256};
use alloy_sol_types::SolStruct;

/// Digest owners sign and the contract verifies.
pub type SafeTxHash = B256;

mod current {
    alloy_sol_types::sol! {
        #[derive(Debug, serde::Serialize, serde::Deserialize)]
        struct SafeTx {
            address to;
            uint256 value;
            bytes data;
            uint8 operation;
            uint256 safeTxGas;
            uint256 baseGas;
            uint256 gasPrice;
            address gasToken;
            address refundReceiver;
            uint256 nonce;
        }
    }
}

/// Pre-1.0.0 singletons call the second gas field `dataGas`, which changes the type hash.
mod legacy {
    alloy_sol_types::sol! {
        #[derive(Debug, serde::Serialize, serde::Deserialize)]
        struct SafeTx {
            address to;
            uint256 value;
            bytes data;
            uint8 operation;
            uint256 safeTxGas;
            uint256 dataGas;
            uint256 gasPrice;
            address gasToken;
            address refundReceiver;
            uint256 nonce;
        }
    }
}

impl From<&SafeTransaction> for current::SafeTx {
    fn from(tx: &SafeTransaction) -> Self {
        Self {
            to: tx.to,
            value: tx.value,
            data: tx.data.clone(),
            operation: tx.operation.into(),
            safeTxGas: tx.safe_tx_gas,
            baseGas: tx.base_gas,
            gasPrice: tx.gas_price,
            gasToken: tx.gas_token,
            refundReceiver: tx.refund_receiver,
            nonce: U256::from(tx.nonce),
        }
    }
}

impl From<&SafeTransaction> for legacy::SafeTx {
    fn from(tx: &SafeTransaction) -> Self {
        Self {
            to: tx.to,
            value: tx.value,
            data: tx.data.clone(),
            operation: tx.operation.into(),
            safeTxGas: tx.safe_tx_gas,
            dataGas: tx.base_gas,
            gasPrice: tx.gas_price,
            gasToken: tx.gas_token,
            refundReceiver: tx.refund_receiver,
            nonce: U256::from(tx.nonce),
        }
    }
}

/// Computes the Safe transaction hash. Pure and deterministic.
pub fn compute_hash(domain: &SafeDomain, tx: &SafeTransaction) -> SafeTxHash {
    let eip712 = domain.eip712_domain();
    if domain.version.uses_base_gas() {
        current::SafeTx::from(tx).eip712_signing_hash(&eip712)
    } else {
        legacy::SafeTx::from(tx).eip712_signing_hash(&eip712)
    }
}

/// The `eth_signTypedData_v4` payload whose signing hash equals [`compute_hash`].
pub fn typed_data(domain: &SafeDomain, tx: &SafeTransaction) -> TypedData {
    let eip712 = domain.eip712_domain();
    if domain.version.uses_base_gas() {
        TypedData::from_struct(&current::SafeTx::from(tx), Some(eip712))
    } else {
        TypedData::from_struct(&legacy::SafeTx::from(tx), Some(eip712))
    }
}
