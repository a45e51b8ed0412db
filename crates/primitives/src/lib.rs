//! Safe multisig transaction primitives.
//!
//! Descriptors, EIP-712 hashing, owner-set changes, origin metadata and the records a relay
//! store keeps. Nothing here performs I/O.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod address;
pub mod amount;
pub mod error;
pub mod hash;
pub mod origin;
pub mod owners;
pub mod record;
pub mod transaction;
pub mod version;
pub mod wallet;

pub use address::{checksummed, normalize_address};
pub use amount::{from_base_units, to_base_units};
pub use error::{CosignError, Result};
pub use hash::{SafeTxHash, compute_hash, typed_data};
pub use origin::OriginMetadata;
pub use owners::OwnerAction;
pub use record::{Confirmation, PendingTransactionRecord, Proposal, SIGNATURE_LEN};
pub use transaction::{Operation, SafeTransaction};
pub use version::SafeVersion;
pub use wallet::{SafeDomain, Wallet};
