use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bound on a single chain read or broadcast.
pub const DEFAULT_CHAIN_TIMEOUT: Duration = Duration::from_secs(30);
/// Default bound on waiting for an execution receipt.
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Chain endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chain id, part of every transaction hash domain.
    pub id: u64,
    pub rpc_url: String,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default = "default_receipt_timeout", with = "humantime_serde")]
    pub receipt_timeout: Duration,
    #[serde(default = "default_receipt_poll_interval", with = "humantime_serde")]
    pub receipt_poll_interval: Duration,
}

impl ChainConfig {
    pub fn new(id: u64, rpc_url: impl Into<String>) -> Self {
        Self {
            id,
            rpc_url: rpc_url.into(),
            timeout: DEFAULT_CHAIN_TIMEOUT,
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
            receipt_poll_interval: DEFAULT_RECEIPT_POLL_INTERVAL,
        }
    }
}

const fn default_timeout() -> Duration {
    DEFAULT_CHAIN_TIMEOUT
}

const fn default_receipt_timeout() -> Duration {
    DEFAULT_RECEIPT_TIMEOUT
}

const fn default_receipt_poll_interval() -> Duration {
    DEFAULT_RECEIPT_POLL_INTERVAL
}
