//! Signer bridge.
//!
//! One capability surface, [`SignerBridge`], over two custody models: a key embedded in the
//! process ([`LocalKeySigner`]) and a key managed by a wallet extension reached over JSON-RPC
//! ([`RpcWalletSigner`]). The kind is chosen once, when the session is created.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod bridge;
mod chain;
pub mod config;
pub mod local;
pub mod rpc_wallet;
pub mod timeout;

pub use bridge::{ChainQuery, ChainReadExt, ChainState, RawCall, ReceiptStatus, SignerBridge};
pub use config::ChainConfig;
pub use local::LocalKeySigner;
pub use rpc_wallet::RpcWalletSigner;
pub use timeout::with_timeout;
