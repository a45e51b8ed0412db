//! Session configuration, read from TOML.
//!
//! ```toml
//! [relay]
//! url = "https://safe-transaction-sepolia.safe.global/api"
//! api_key = "..."
//! timeout = "30s"
//!
//! [chain]
//! id = 11155111
//! rpc_url = "https://ethereum-sepolia-rpc.publicnode.com"
//! receipt_timeout = "2m"
//!
//! [policy]
//! custom_threshold = "strict"
//! ```

use cosign_relay::RelayConfig;
use cosign_signer::ChainConfig;
use derive_more::Display;
use eyre::{Result, WrapErr, ensure};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CosignConfig {
    pub relay: RelayConfig,
    pub chain: ChainConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub custom_threshold: CustomThresholdPolicy,
}

/// What to do with a proposal whose custom threshold is below the Safe threshold.
///
/// The contract only ever enforces its own threshold, so such a transaction cannot execute
/// until the Safe threshold is reached regardless of the custom value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum CustomThresholdPolicy {
    /// Refuse the proposal.
    #[default]
    #[display("strict")]
    Strict,
    /// Log a warning and propose anyway.
    #[display("warn")]
    Warn,
}

impl CosignConfig {
    /// Reads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).wrap_err_with(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).wrap_err("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.relay.url.trim().is_empty(), "relay.url must be set");
        ensure!(!self.chain.rpc_url.trim().is_empty(), "chain.rpc_url must be set");
        ensure!(self.chain.id != 0, "chain.id must be non-zero");
        for (name, value) in [
            ("relay.timeout", self.relay.timeout),
            ("chain.timeout", self.chain.timeout),
            ("chain.receipt_timeout", self.chain.receipt_timeout),
            ("chain.receipt_poll_interval", self.chain.receipt_poll_interval),
        ] {
            ensure!(value > Duration::ZERO, "{name} must be positive");
        }
        Ok(())
    }

    /// Local anvil chain, short timeouts, strict policy.
    pub fn default_test_config() -> Self {
        let mut chain = ChainConfig::new(31337, "http://127.0.0.1:8545");
        chain.timeout = Duration::from_secs(5);
        chain.receipt_timeout = Duration::from_secs(2);
        chain.receipt_poll_interval = Duration::from_millis(10);
        Self {
            relay: RelayConfig::new("http://127.0.0.1:8000/api").with_timeout(Duration::from_secs(5)),
            chain,
            policy: PolicyConfig::default(),
        }
    }
}
