//! Quorum evaluation over already-fetched data. Nothing here performs I/O.

use cosign_primitives::{PendingTransactionRecord, Wallet};
use derive_more::Display;

/// Where the required signature count comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ThresholdSource {
    #[display("safe threshold")]
    Wallet,
    #[display("custom threshold")]
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuorumStatus {
    /// Distinct current owners that confirmed.
    pub collected: usize,
    pub required: u64,
    pub source: ThresholdSource,
    /// The threshold the contract enforces at execution.
    pub onchain_threshold: u64,
}

impl QuorumStatus {
    pub fn is_met(&self) -> bool {
        self.collected as u64 >= self.required
    }

    pub fn missing(&self) -> u64 {
        self.required.saturating_sub(self.collected as u64)
    }

    /// The required count was met but the contract will still refuse: a custom threshold
    /// below the Safe threshold.
    pub fn below_onchain_threshold(&self) -> bool {
        self.is_met() && (self.collected as u64) < self.onchain_threshold
    }
}

/// The custom threshold carried in the record's origin, otherwise the Safe threshold.
pub fn required_signatures(record: &PendingTransactionRecord, wallet: &Wallet) -> u64 {
    record
        .transaction
        .origin
        .custom_threshold()
        .unwrap_or(wallet.threshold())
}

pub fn quorum_status(record: &PendingTransactionRecord, wallet: &Wallet) -> QuorumStatus {
    let custom = record.transaction.origin.custom_threshold();
    QuorumStatus {
        collected: record.confirmation_count(wallet.owners()),
        required: custom.unwrap_or(wallet.threshold()),
        source: if custom.is_some() {
            ThresholdSource::Custom
        } else {
            ThresholdSource::Wallet
        },
        onchain_threshold: wallet.threshold(),
    }
}

/// True once enough owners confirmed, provided the record's nonce is still open.
pub fn is_executable(record: &PendingTransactionRecord, wallet: &Wallet) -> bool {
    !record.executed
        && !wallet.is_nonce_consumed(record.nonce())
        && quorum_status(record, wallet).is_met()
}
