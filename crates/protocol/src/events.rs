use alloy_primitives::{Address, TxHash};
use cosign_primitives::SafeTxHash;

/// Capacity of the session event channel. Slow subscribers miss the oldest events and
/// should refresh from the relay store.
pub(crate) const EVENT_CAPACITY: usize = 64;

/// State changes a UI layer subscribes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CosignEvent {
    Proposed {
        safe: Address,
        safe_tx_hash: SafeTxHash,
        nonce: u64,
    },
    Confirmed {
        safe_tx_hash: SafeTxHash,
        owner: Address,
    },
    Executed {
        safe: Address,
        safe_tx_hash: SafeTxHash,
        tx_hash: TxHash,
    },
    PendingRefreshed {
        safe: Address,
        count: usize,
    },
}
