//! Error taxonomy shared by every cosign crate.

use alloy_primitives::{Address, B256};
use std::time::Duration;

/// Result type alias that carries [`CosignError`] failures.
pub type Result<T, E = CosignError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CosignError {
    #[error("invalid address `{0}`")]
    InvalidAddress(String),

    #[error("invalid amount `{amount}`: {reason}")]
    InvalidAmount { amount: String, reason: String },

    #[error("invalid threshold {threshold} for {owners} owners")]
    InvalidThreshold { threshold: u64, owners: usize },

    #[error("{0} is already an owner")]
    DuplicateOwner(Address),

    #[error("{0} is not an owner of this Safe")]
    OwnerNotFound(Address),

    #[error("a Safe needs at least one owner")]
    TooFewOwners,

    #[error("no active signer session")]
    SignerUnavailable,

    #[error("signer declined the request: {0}")]
    SignerRejected(String),

    #[error("signer failed: {0}")]
    Signer(String),

    #[error("{0} is not an owner of this Safe and cannot sign")]
    NotAnOwner(Address),

    #[error("{owner} already signed {safe_tx_hash}")]
    AlreadySigned { owner: Address, safe_tx_hash: B256 },

    #[error(
        "transaction hash mismatch: expected {expected}, recomputed {computed}; the transaction data changed, do not sign or execute"
    )]
    HashMismatch { expected: B256, computed: B256 },

    #[error("{collected} of {required} required signatures collected; wait for more owners to sign")]
    InsufficientSignatures { collected: usize, required: u64 },

    #[error(
        "custom threshold {custom} is below the Safe threshold {default}; the contract would reject execution until {default} owners sign"
    )]
    CustomThresholdBelowDefault { custom: u64, default: u64 },

    #[error("relay store refused the request (status {status}): {body}")]
    ProposalRejected { status: u16, body: String },

    #[error("`{operation}` timed out after {after:?}")]
    NetworkTimeout { operation: String, after: Duration },

    #[error("relay store request failed: {0}")]
    Relay(String),

    #[error("chain request failed: {0}")]
    Chain(String),

    #[error("on-chain execution failed: {reason}{}", threshold_gap_hint(.below_onchain_threshold))]
    OnchainExecutionFailed {
        reason: String,
        /// The collected signatures met a custom threshold but not the contract threshold.
        below_onchain_threshold: bool,
    },

    #[error("nonce {nonce} was already used; the Safe is at nonce {current}")]
    NonceConsumed { nonce: u64, current: u64 },

    #[error("malformed signature from {owner}: {reason}")]
    MalformedSignature { owner: Address, reason: String },

    #[error("malformed origin metadata: {0}")]
    MalformedOrigin(String),

    #[error("an operation for {0} is already in flight")]
    OperationInFlight(B256),

    #[error("no Safe deployed at {0}")]
    NotDeployed(Address),

    #[error("invalid configuration: {0}")]
    Config(String),
}

fn threshold_gap_hint(below_onchain_threshold: &bool) -> &'static str {
    if *below_onchain_threshold {
        " (the custom threshold was met but custom thresholds below the Safe threshold are not enforced by the contract; more owners must sign)"
    } else {
        ""
    }
}

impl CosignError {
    /// True when the user can resolve the failure by waiting for more signatures.
    pub fn is_waiting_on_signers(&self) -> bool {
        matches!(
            self,
            Self::InsufficientSignatures { .. }
                | Self::OnchainExecutionFailed {
                    below_onchain_threshold: true,
                    ..
                }
        )
    }

    /// True when the failure was raised before anything reached the network.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAddress(_)
                | Self::InvalidAmount { .. }
                | Self::InvalidThreshold { .. }
                | Self::DuplicateOwner(_)
                | Self::OwnerNotFound(_)
                | Self::TooFewOwners
                | Self::CustomThresholdBelowDefault { .. }
                | Self::MalformedOrigin(_)
        )
    }

    pub(crate) fn invalid_amount(amount: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAmount {
            amount: amount.to_string(),
            reason: reason.into(),
        }
    }
}
