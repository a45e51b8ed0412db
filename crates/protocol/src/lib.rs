//! Safe multisig transaction lifecycle.
//!
//! A [`Session`] ties one signer bridge to one relay store. Through it an owner builds a
//! transaction, signs and proposes it, other owners add confirmations, and once the
//! required signatures are collected any owner executes it on chain.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod builder;
mod collector;
pub mod config;
pub mod events;
pub mod executor;
mod guard;
pub mod metrics;
pub mod pending;
pub mod quorum;
pub mod session;
pub mod state;

#[cfg(test)]
mod tests;

pub use builder::{TransferAsset, build_owner_change, build_rejection, build_transfer, next_nonce};
pub use config::{CosignConfig, CustomThresholdPolicy, PolicyConfig};
pub use events::CosignEvent;
pub use executor::{ExecutionReceipt, pack_signatures};
pub use metrics::CosignMetrics;
pub use pending::{EntryKind, PendingEntry, PendingView, build_view, classify};
pub use quorum::{QuorumStatus, ThresholdSource, is_executable, quorum_status, required_signatures};
pub use session::Session;
pub use state::OperationState;
