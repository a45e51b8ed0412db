//! The pending-set view: every unexecuted record of a Safe with what a UI needs to show
//! and act on it.

use crate::{
    events::CosignEvent,
    quorum::{QuorumStatus, is_executable, quorum_status},
    session::Session,
};
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use cosign_contracts::IERC20;
use cosign_primitives::{
    CosignError, OwnerAction, PendingTransactionRecord, Result, SafeTxHash, Wallet,
};
use tracing::debug;

/// What a pending transaction does, decoded on a best-effort basis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Burns a nonce. `rejects` is the transaction it invalidates when known.
    Rejection { rejects: Option<SafeTxHash> },
    NativeTransfer { recipient: Address, amount: U256 },
    TokenTransfer { token: Address, recipient: Address, amount: U256 },
    OwnerChange(OwnerAction),
    /// Call data that could not be decoded; show destination and value as is.
    Call { to: Address, value: U256 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    pub record: PendingTransactionRecord,
    pub kind: EntryKind,
    pub quorum: QuorumStatus,
    pub executable: bool,
    /// The active signer already confirmed. `false` when no signer session is active.
    pub signed_by_me: bool,
    /// The nonce was consumed by another execution; the entry can never execute.
    pub stale: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingView {
    pub safe: Address,
    pub nonce: u64,
    /// Sorted by nonce, then by submission time.
    pub entries: Vec<PendingEntry>,
}

impl PendingView {
    pub fn executable(&self) -> impl Iterator<Item = &PendingEntry> {
        self.entries.iter().filter(|entry| entry.executable)
    }

    /// Entries competing for `nonce`; at most one of them can ever execute.
    pub fn at_nonce(&self, nonce: u64) -> impl Iterator<Item = &PendingEntry> {
        self.entries.iter().filter(move |entry| entry.record.nonce() == nonce)
    }
}

/// Decodes the call. `siblings` are the other records of the Safe, used to find the
/// target of a rejection whose origin does not name it.
pub fn classify(
    record: &PendingTransactionRecord,
    siblings: &[PendingTransactionRecord],
    safe: Address,
) -> EntryKind {
    let tx = &record.transaction;
    if let Some(target) = tx.origin.rejected_hash() {
        return EntryKind::Rejection {
            rejects: Some(target),
        };
    }
    if tx.is_rejection_shape(safe) {
        let mut rivals = siblings.iter().filter(|other| {
            other.nonce() == tx.nonce
                && other.safe_tx_hash != record.safe_tx_hash
                && !other.transaction.is_rejection_shape(safe)
        });
        let rejects = match (rivals.next(), rivals.next()) {
            (Some(only), None) => Some(only.safe_tx_hash),
            _ => None,
        };
        return EntryKind::Rejection { rejects };
    }
    if tx.data.is_empty() {
        return EntryKind::NativeTransfer {
            recipient: tx.to,
            amount: tx.value,
        };
    }
    if tx.to == safe
        && let Some(action) = OwnerAction::decode(&tx.data)
    {
        return EntryKind::OwnerChange(action);
    }
    match IERC20::transferCall::abi_decode(&tx.data) {
        Ok(call) if tx.value.is_zero() => EntryKind::TokenTransfer {
            token: tx.to,
            recipient: call.to,
            amount: call.amount,
        },
        Ok(_) => EntryKind::Call {
            to: tx.to,
            value: tx.value,
        },
        Err(err) => {
            debug!(safe_tx_hash = %record.safe_tx_hash, error = %err, "call data not decoded");
            EntryKind::Call {
                to: tx.to,
                value: tx.value,
            }
        }
    }
}

/// Builds the view from fetched records. `me` is the active signer, if any.
pub fn build_view(
    wallet: &Wallet,
    records: Vec<PendingTransactionRecord>,
    me: Option<Address>,
) -> PendingView {
    let mut entries: Vec<PendingEntry> = records
        .iter()
        .filter(|record| record.safe == wallet.address() && !record.executed)
        .map(|record| PendingEntry {
            kind: classify(record, &records, wallet.address()),
            quorum: quorum_status(record, wallet),
            executable: is_executable(record, wallet),
            signed_by_me: me.is_some_and(|me| record.has_confirmation_from(&me)),
            stale: wallet.is_nonce_consumed(record.nonce()),
            record: record.clone(),
        })
        .collect();
    entries.sort_by(|a, b| {
        a.record
            .nonce()
            .cmp(&b.record.nonce())
            .then_with(|| a.record.submitted_at.cmp(&b.record.submitted_at))
    });

    PendingView {
        safe: wallet.address(),
        nonce: wallet.nonce(),
        entries,
    }
}

impl Session {
    /// Fetches every unexecuted record of `wallet` in one relay round-trip. Safe to call
    /// again at any time to refresh.
    pub async fn list_pending(&self, wallet: &Wallet) -> Result<PendingView> {
        let records = self.relay_call(self.relay.pending(wallet.address())).await?;
        let me = match self.signer.active_address().await {
            Ok(address) => Some(address),
            Err(CosignError::SignerUnavailable) => None,
            Err(err) => return Err(err),
        };
        let view = build_view(wallet, records, me);

        debug!(safe = %wallet.address(), count = view.entries.len(), "Refreshed pending set");
        self.emit(CosignEvent::PendingRefreshed {
            safe: wallet.address(),
            count: view.entries.len(),
        });
        Ok(view)
    }
}
