use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use cosign_primitives::{PendingTransactionRecord, Proposal, Result, SafeTxHash};
use serde::{Deserialize, Serialize};

/// Safe state as the relay store indexes it. It lags the chain and is only used when a
/// chain read is unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeInfo {
    pub address: Address,
    pub nonce: u64,
    pub threshold: u64,
    pub owners: Vec<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Off-chain store of proposed transactions and their confirmations.
///
/// The confirmation list of a record is append-only; it is the only point where approvers
/// in different sessions coordinate.
#[async_trait]
pub trait RelayStore: Send + Sync {
    /// Creates a pending record from a signed proposal.
    async fn propose(&self, proposal: &Proposal) -> Result<()>;

    /// Appends a confirmation. The store attributes it to the owner that produced the
    /// signature.
    async fn confirm(&self, safe_tx_hash: SafeTxHash, signature: &Bytes) -> Result<()>;

    /// Every record for `safe` that has not been executed.
    async fn pending(&self, safe: Address) -> Result<Vec<PendingTransactionRecord>>;

    /// Current state of a single record.
    async fn transaction(&self, safe_tx_hash: SafeTxHash) -> Result<PendingTransactionRecord>;

    async fn safe_info(&self, safe: Address) -> Result<SafeInfo>;
}
