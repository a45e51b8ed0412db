//! Collecting owner signatures: proposing a new transaction with the proposer's signature
//! and adding confirmations to an existing one.

use crate::{config::CustomThresholdPolicy, events::CosignEvent, session::Session};
use alloy_primitives::{Address, Bytes};
use cosign_primitives::{
    Confirmation, CosignError, OriginMetadata, PendingTransactionRecord, Proposal, Result,
    SafeTransaction, SafeTxHash, Wallet, compute_hash, typed_data,
};
use tracing::{info, warn};

impl Session {
    /// Hashes `tx`, signs the hash as typed data and stores the proposal with the
    /// signature as its first confirmation.
    pub async fn sign_and_propose(
        &self,
        wallet: &Wallet,
        tx: SafeTransaction,
    ) -> Result<(SafeTxHash, Confirmation)> {
        self.check_origin(wallet, &tx.origin)?;
        if wallet.is_nonce_consumed(tx.nonce) {
            return Err(CosignError::NonceConsumed {
                nonce: tx.nonce,
                current: wallet.nonce(),
            });
        }

        let sender = self.signer.active_address().await?;
        if !wallet.is_owner(&sender) {
            return Err(CosignError::NotAnOwner(sender));
        }

        let domain = wallet.domain();
        let safe_tx_hash = compute_hash(&domain, &tx);
        let _guard = self.in_flight.acquire(safe_tx_hash)?;

        let signature = self.sign_hash(sender, &typed_data(&domain, &tx), safe_tx_hash).await?;
        let proposal = Proposal {
            safe: wallet.address(),
            transaction: tx,
            safe_tx_hash,
            sender,
            signature,
        };
        self.relay_call(self.relay.propose(&proposal)).await?;

        self.metrics.record_proposal();
        info!(
            safe = %proposal.safe,
            nonce = proposal.transaction.nonce,
            %safe_tx_hash,
            %sender,
            "Proposed transaction"
        );
        self.emit(CosignEvent::Proposed {
            safe: proposal.safe,
            safe_tx_hash,
            nonce: proposal.transaction.nonce,
        });
        Ok((safe_tx_hash, proposal.confirmation()))
    }

    /// Adds the active owner's confirmation to `record`.
    ///
    /// The hash is recomputed from the record's fields and must equal the stored hash
    /// before anything is signed. Ownership, duplicate and hash checks all run before any
    /// request reaches the relay store.
    pub async fn sign_existing(
        &self,
        wallet: &Wallet,
        record: &PendingTransactionRecord,
    ) -> Result<Confirmation> {
        let owner = self.signer.active_address().await?;
        if !wallet.is_owner(&owner) {
            return Err(CosignError::NotAnOwner(owner));
        }
        if record.has_confirmation_from(&owner) {
            self.metrics.record_double_sign();
            return Err(CosignError::AlreadySigned {
                owner,
                safe_tx_hash: record.safe_tx_hash,
            });
        }

        let domain = wallet.domain();
        self.verify_hash(record, compute_hash(&domain, &record.transaction))?;
        if record.executed || wallet.is_nonce_consumed(record.nonce()) {
            return Err(CosignError::NonceConsumed {
                nonce: record.nonce(),
                current: wallet.nonce(),
            });
        }

        let _guard = self.in_flight.acquire(record.safe_tx_hash)?;
        let signature = self
            .sign_hash(owner, &typed_data(&domain, &record.transaction), record.safe_tx_hash)
            .await?;
        self.relay_call(self.relay.confirm(record.safe_tx_hash, &signature)).await?;

        self.metrics.record_confirmation();
        info!(safe_tx_hash = %record.safe_tx_hash, %owner, "Confirmed transaction");
        self.emit(CosignEvent::Confirmed {
            safe_tx_hash: record.safe_tx_hash,
            owner,
        });
        Ok(Confirmation::new(owner, signature))
    }

    /// Proposes the rejection of `record`: an empty self call at the same nonce, linked to
    /// the rejected hash through its origin.
    pub async fn reject(
        &self,
        wallet: &Wallet,
        record: &PendingTransactionRecord,
    ) -> Result<(SafeTxHash, Confirmation)> {
        let tx = crate::builder::build_rejection(wallet, record.nonce())?.with_origin(
            OriginMetadata::RejectionOf {
                safe_tx_hash: record.safe_tx_hash,
            },
        );
        self.sign_and_propose(wallet, tx).await
    }

    pub(crate) fn verify_hash(
        &self,
        record: &PendingTransactionRecord,
        computed: SafeTxHash,
    ) -> Result<()> {
        if computed != record.safe_tx_hash {
            self.metrics.record_hash_mismatch();
            warn!(expected = %record.safe_tx_hash, %computed, "Recomputed hash does not match");
            return Err(CosignError::HashMismatch {
                expected: record.safe_tx_hash,
                computed,
            });
        }
        Ok(())
    }

    fn check_origin(&self, wallet: &Wallet, origin: &OriginMetadata) -> Result<()> {
        let Some(custom) = origin.custom_threshold() else {
            return Ok(());
        };
        let owners = wallet.owners().len();
        if custom == 0 || custom > owners as u64 {
            return Err(CosignError::InvalidThreshold {
                threshold: custom,
                owners,
            });
        }
        if custom < wallet.threshold() {
            match self.config.policy.custom_threshold {
                CustomThresholdPolicy::Strict => {
                    return Err(CosignError::CustomThresholdBelowDefault {
                        custom,
                        default: wallet.threshold(),
                    });
                }
                CustomThresholdPolicy::Warn => warn!(
                    safe = %wallet.address(),
                    custom,
                    threshold = wallet.threshold(),
                    "Custom threshold is below the Safe threshold; execution needs the Safe threshold"
                ),
            }
        }
        Ok(())
    }

    /// Signs through the bridge and checks that the single returned signature belongs to
    /// `signer` and covers `safe_tx_hash`.
    async fn sign_hash(
        &self,
        signer: Address,
        typed: &alloy_dyn_abi::TypedData,
        safe_tx_hash: SafeTxHash,
    ) -> Result<Bytes> {
        let signature = self.signer.sign_typed_data(typed).await?;
        let bytes = Bytes::from(signature.as_bytes().to_vec());
        Confirmation::new(signer, bytes.clone()).verify(safe_tx_hash)?;
        Ok(bytes)
    }
}
