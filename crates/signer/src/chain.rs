//! Provider-backed chain reads shared by both signer kinds.

use crate::{
    bridge::{ChainQuery, ChainState, ReceiptStatus},
    timeout::with_timeout,
};
use alloy_provider::{DynProvider, Provider};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_transport::{RpcError, TransportErrorKind};
use cosign_primitives::{CosignError, Result};
use std::time::Duration;
use tracing::debug;

/// EIP-1193 "user rejected request".
const USER_REJECTED: i64 = 4001;
/// EIP-1193 "unauthorized" and "disconnected".
const UNAUTHORIZED: i64 = 4100;
const DISCONNECTED: i64 = 4900;

/// Maps a JSON-RPC failure onto the signer error kinds. Error payloads keep their message
/// so revert strings reach the caller untouched.
pub(crate) fn rpc_error(operation: &str, err: RpcError<TransportErrorKind>) -> CosignError {
    match err.as_error_resp() {
        Some(payload) if payload.code == USER_REJECTED => {
            CosignError::SignerRejected(payload.message.to_string())
        }
        Some(payload) if payload.code == UNAUTHORIZED || payload.code == DISCONNECTED => {
            CosignError::SignerUnavailable
        }
        Some(payload) => CosignError::Chain(format!("{operation}: {}", payload.message)),
        None => CosignError::Chain(format!("{operation}: {err}")),
    }
}

pub(crate) async fn read(
    provider: &DynProvider,
    query: ChainQuery,
    timeout: Duration,
) -> Result<ChainState> {
    debug!(?query, "reading chain state");
    match query {
        ChainQuery::Balance(address) => with_timeout("eth_getBalance", timeout, async {
            provider
                .get_balance(address)
                .await
                .map(ChainState::Balance)
                .map_err(|err| rpc_error("eth_getBalance", err))
        })
        .await,
        ChainQuery::Code(address) => with_timeout("eth_getCode", timeout, async {
            provider
                .get_code_at(address)
                .await
                .map(ChainState::Code)
                .map_err(|err| rpc_error("eth_getCode", err))
        })
        .await,
        ChainQuery::Nonce(address) => with_timeout("eth_getTransactionCount", timeout, async {
            provider
                .get_transaction_count(address)
                .await
                .map(ChainState::Nonce)
                .map_err(|err| rpc_error("eth_getTransactionCount", err))
        })
        .await,
        ChainQuery::Call { to, data } => with_timeout("eth_call", timeout, async {
            let tx = TransactionRequest::default().to(to).input(data.into());
            provider
                .call(tx)
                .await
                .map(ChainState::Call)
                .map_err(|err| rpc_error("eth_call", err))
        })
        .await,
        ChainQuery::Receipt(tx_hash) => with_timeout("eth_getTransactionReceipt", timeout, async {
            let receipt = provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(|err| rpc_error("eth_getTransactionReceipt", err))?;
            Ok(ChainState::Receipt(receipt.map(|receipt| ReceiptStatus {
                tx_hash: receipt.transaction_hash,
                success: receipt.inner.status(),
                block_number: receipt.block_number,
                logs: receipt.inner.logs().iter().map(|log| log.inner.clone()).collect(),
            })))
        })
        .await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn payload_error(code: i64, message: &str) -> RpcError<TransportErrorKind> {
        RpcError::ErrorResp(
            serde_json::from_value(serde_json::json!({ "code": code, "message": message }))
                .unwrap(),
        )
    }

    #[test_case(4001, "User denied message signature", CosignError::SignerRejected("User denied message signature".into()) ; "user rejected")]
    #[test_case(4100, "unauthorized", CosignError::SignerUnavailable ; "unauthorized")]
    #[test_case(4900, "disconnected", CosignError::SignerUnavailable ; "disconnected")]
    #[test_case(3, "execution reverted: GS026", CosignError::Chain("eth_sendTransaction: execution reverted: GS026".into()) ; "revert keeps message")]
    #[test_case(-32000, "nonce too low", CosignError::Chain("eth_sendTransaction: nonce too low".into()) ; "other server error")]
    fn maps_eip1193_codes(code: i64, message: &str, expected: CosignError) {
        assert_eq!(rpc_error("eth_sendTransaction", payload_error(code, message)), expected);
    }
}
