//! Access to the relay store: the off-chain service that keeps proposed Safe transactions
//! and the confirmations owners attach to them.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod config;
pub mod memory;
pub mod service;
pub mod store;
mod wire;

pub use config::RelayConfig;
pub use memory::InMemoryRelay;
pub use service::TransactionService;
pub use store::{RelayStore, SafeInfo};
