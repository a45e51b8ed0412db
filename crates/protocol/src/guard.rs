//! Per-record in-flight marker. A second signing or execution request for a record that
//! already has one running in this session is refused instead of queued.

use cosign_primitives::{CosignError, Result, SafeTxHash};
use parking_lot::Mutex;
use std::{collections::HashSet, sync::Arc};

#[derive(Debug, Clone, Default)]
pub(crate) struct InFlight {
    active: Arc<Mutex<HashSet<SafeTxHash>>>,
}

impl InFlight {
    pub(crate) fn acquire(&self, safe_tx_hash: SafeTxHash) -> Result<InFlightGuard> {
        if !self.active.lock().insert(safe_tx_hash) {
            return Err(CosignError::OperationInFlight(safe_tx_hash));
        }
        Ok(InFlightGuard {
            active: Arc::clone(&self.active),
            safe_tx_hash,
        })
    }

    #[cfg(test)]
    pub(crate) fn is_active(&self, safe_tx_hash: &SafeTxHash) -> bool {
        self.active.lock().contains(safe_tx_hash)
    }
}

/// Releases the marker on drop, including when the operation fails or is cancelled.
#[derive(Debug)]
pub(crate) struct InFlightGuard {
    active: Arc<Mutex<HashSet<SafeTxHash>>>,
    safe_tx_hash: SafeTxHash,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active.lock().remove(&self.safe_tx_hash);
    }
}
