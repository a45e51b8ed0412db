//! Relay store records: proposals, confirmations and the pending transactions they form.

use crate::{
    error::{CosignError, Result},
    hash::SafeTxHash,
    transaction::SafeTransaction,
};
use alloy_primitives::{Address, B256, Bytes, Signature, eip191_hash_message};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Length of an owner ECDSA signature as packed for `execTransaction`.
pub const SIGNATURE_LEN: usize = 65;

/// One owner's signature over a transaction hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub owner: Address,
    pub signature: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<Timestamp>,
}

impl Confirmation {
    pub fn new(owner: Address, signature: impl Into<Bytes>) -> Self {
        Self {
            owner,
            signature: signature.into(),
            submitted_at: None,
        }
    }

    /// Signature bytes, provided they are a 65-byte ECDSA signature the Safe can verify.
    ///
    /// `v` of 27/28 signs the hash directly; 31/32 marks an `eth_sign` over the hash.
    /// Contract signatures and pre-approved hashes are not supported.
    pub fn ecdsa_bytes(&self) -> Result<[u8; SIGNATURE_LEN]> {
        let bytes: [u8; SIGNATURE_LEN] =
            self.signature
                .as_ref()
                .try_into()
                .map_err(|_| CosignError::MalformedSignature {
                    owner: self.owner,
                    reason: format!("expected {SIGNATURE_LEN} bytes, got {}", self.signature.len()),
                })?;
        match bytes[64] {
            27 | 28 | 31 | 32 => Ok(bytes),
            v => Err(CosignError::MalformedSignature {
                owner: self.owner,
                reason: format!("unsupported signature type v={v}"),
            }),
        }
    }

    /// Recovers the address that produced this signature over `safe_tx_hash`.
    pub fn recover_signer(&self, safe_tx_hash: SafeTxHash) -> Result<Address> {
        let mut bytes = self.ecdsa_bytes()?;
        let eth_sign = bytes[64] > 30;
        if eth_sign {
            bytes[64] -= 4;
        }
        let malformed = |err: alloy_primitives::SignatureError| CosignError::MalformedSignature {
            owner: self.owner,
            reason: err.to_string(),
        };
        let signature = Signature::from_raw(&bytes).map_err(malformed)?;
        let prehash = if eth_sign { eip191_hash_message(safe_tx_hash) } else { safe_tx_hash };
        signature.recover_address_from_prehash(&prehash).map_err(malformed)
    }

    /// Checks that the signature was produced by the owner it claims.
    pub fn verify(&self, safe_tx_hash: SafeTxHash) -> Result<()> {
        let recovered = self.recover_signer(safe_tx_hash)?;
        if recovered != self.owner {
            return Err(CosignError::MalformedSignature {
                owner: self.owner,
                reason: format!("signature recovers to {recovered}"),
            });
        }
        Ok(())
    }
}

/// A proposal as submitted to the relay store together with the proposer's signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub safe: Address,
    pub transaction: SafeTransaction,
    pub safe_tx_hash: SafeTxHash,
    pub sender: Address,
    pub signature: Bytes,
}

impl Proposal {
    /// The proposer's signature viewed as the first confirmation.
    pub fn confirmation(&self) -> Confirmation {
        Confirmation::new(self.sender, self.signature.clone())
    }
}

/// A proposed transaction and every confirmation collected so far, as the relay store
/// reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTransactionRecord {
    pub safe: Address,
    pub transaction: SafeTransaction,
    pub safe_tx_hash: SafeTxHash,
    pub confirmations: Vec<Confirmation>,
    #[serde(default)]
    pub executed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposer: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<Timestamp>,
    /// On-chain transaction that executed this record, once known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_tx_hash: Option<B256>,
}

impl PendingTransactionRecord {
    /// Record created from a fresh proposal.
    pub fn from_proposal(proposal: &Proposal, submitted_at: Timestamp) -> Self {
        let mut confirmation = proposal.confirmation();
        confirmation.submitted_at = Some(submitted_at);
        Self {
            safe: proposal.safe,
            transaction: proposal.transaction.clone(),
            safe_tx_hash: proposal.safe_tx_hash,
            confirmations: vec![confirmation],
            executed: false,
            proposer: Some(proposal.sender),
            submitted_at: Some(submitted_at),
            execution_tx_hash: None,
        }
    }

    pub fn nonce(&self) -> u64 {
        self.transaction.nonce
    }

    pub fn has_confirmation_from(&self, owner: &Address) -> bool {
        self.confirmations.iter().any(|c| c.owner == *owner)
    }

    /// Confirmations from current owners, one per owner, in the order they were stored.
    pub fn owner_confirmations<'a>(
        &'a self,
        owners: &'a [Address],
    ) -> impl Iterator<Item = &'a Confirmation> + 'a {
        self.confirmations.iter().enumerate().filter_map(move |(i, c)| {
            let first = self.confirmations[..i].iter().all(|earlier| earlier.owner != c.owner);
            (first && owners.contains(&c.owner)).then_some(c)
        })
    }

    /// Number of distinct current owners that confirmed.
    pub fn confirmation_count(&self, owners: &[Address]) -> usize {
        self.owner_confirmations(owners).count()
    }
}
