//! Process-local relay store for offline sessions and tests.

use crate::store::{RelayStore, SafeInfo};
use alloy_primitives::{Address, B256, Bytes};
use async_trait::async_trait;
use cosign_primitives::{
    Confirmation, CosignError, PendingTransactionRecord, Proposal, Result, SafeTxHash,
};
use jiff::Timestamp;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<SafeTxHash, PendingTransactionRecord>,
    /// Insertion order, so listings are stable.
    order: Vec<SafeTxHash>,
    safes: HashMap<Address, SafeInfo>,
}

/// [`RelayStore`] kept in memory. It refuses what the hosted service refuses: duplicate
/// proposals, signatures that do not recover to the claimed sender and second
/// confirmations from the same owner.
#[derive(Debug, Default)]
pub struct InMemoryRelay {
    inner: RwLock<Inner>,
}

impl InMemoryRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the indexed state returned by [`RelayStore::safe_info`].
    pub fn register_safe(&self, info: SafeInfo) {
        self.inner.write().safes.insert(info.address, info);
    }

    /// Marks a record executed, as the hosted service does once it indexes the execution.
    /// Other records with the same nonce stay listed until the caller drops them.
    pub fn mark_executed(&self, safe_tx_hash: SafeTxHash, execution_tx_hash: B256) -> Result<()> {
        let mut inner = self.inner.write();
        let record = inner
            .records
            .get_mut(&safe_tx_hash)
            .ok_or_else(|| not_found(safe_tx_hash))?;
        record.executed = true;
        record.execution_tx_hash = Some(execution_tx_hash);
        let (safe, nonce) = (record.safe, record.nonce());
        if let Some(info) = inner.safes.get_mut(&safe) {
            info.nonce = info.nonce.max(nonce + 1);
        }
        Ok(())
    }

    /// Overwrites a stored record. Lets tests simulate a tampered or inconsistent store.
    pub fn replace(&self, record: PendingTransactionRecord) {
        let mut inner = self.inner.write();
        if !inner.records.contains_key(&record.safe_tx_hash) {
            inner.order.push(record.safe_tx_hash);
        }
        inner.records.insert(record.safe_tx_hash, record);
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn not_found(safe_tx_hash: SafeTxHash) -> CosignError {
    CosignError::Relay(format!("no transaction with hash {safe_tx_hash}"))
}

fn refused(body: impl Into<String>) -> CosignError {
    CosignError::ProposalRejected {
        status: 422,
        body: body.into(),
    }
}

#[async_trait]
impl RelayStore for InMemoryRelay {
    async fn propose(&self, proposal: &Proposal) -> Result<()> {
        proposal
            .confirmation()
            .verify(proposal.safe_tx_hash)
            .map_err(|err| refused(err.to_string()))?;

        let mut inner = self.inner.write();
        if inner.records.contains_key(&proposal.safe_tx_hash) {
            return Err(refused(format!(
                "transaction {} already exists",
                proposal.safe_tx_hash
            )));
        }
        let record = PendingTransactionRecord::from_proposal(proposal, Timestamp::now());
        debug!(safe = %record.safe, nonce = record.nonce(), safe_tx_hash = %record.safe_tx_hash, "stored proposal");
        inner.order.push(record.safe_tx_hash);
        inner.records.insert(record.safe_tx_hash, record);
        Ok(())
    }

    async fn confirm(&self, safe_tx_hash: SafeTxHash, signature: &Bytes) -> Result<()> {
        let owner = Confirmation::new(Address::ZERO, signature.clone())
            .recover_signer(safe_tx_hash)
            .map_err(|err| refused(err.to_string()))?;

        let mut inner = self.inner.write();
        let record = inner
            .records
            .get_mut(&safe_tx_hash)
            .ok_or_else(|| not_found(safe_tx_hash))?;
        if record.has_confirmation_from(&owner) {
            return Err(refused(format!("{owner} already confirmed {safe_tx_hash}")));
        }
        record.confirmations.push(Confirmation {
            owner,
            signature: signature.clone(),
            submitted_at: Some(Timestamp::now()),
        });
        debug!(%safe_tx_hash, %owner, count = record.confirmations.len(), "stored confirmation");
        Ok(())
    }

    async fn pending(&self, safe: Address) -> Result<Vec<PendingTransactionRecord>> {
        let inner = self.inner.read();
        Ok(inner
            .order
            .iter()
            .filter_map(|hash| inner.records.get(hash))
            .filter(|record| record.safe == safe && !record.executed)
            .cloned()
            .collect())
    }

    async fn transaction(&self, safe_tx_hash: SafeTxHash) -> Result<PendingTransactionRecord> {
        self.inner
            .read()
            .records
            .get(&safe_tx_hash)
            .cloned()
            .ok_or_else(|| not_found(safe_tx_hash))
    }

    async fn safe_info(&self, safe: Address) -> Result<SafeInfo> {
        self.inner
            .read()
            .safes
            .get(&safe)
            .cloned()
            .ok_or(CosignError::NotDeployed(safe))
    }
}
