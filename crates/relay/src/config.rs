use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bound on a single relay store request.
pub const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_secs(30);

/// Relay store connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Base URL of the service API, e.g. `https://safe-transaction-sepolia.safe.global/api`.
    pub url: String,
    /// Sent as a bearer token when present. Some deployments do not require one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl RelayConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            timeout: DEFAULT_RELAY_TIMEOUT,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

const fn default_timeout() -> Duration {
    DEFAULT_RELAY_TIMEOUT
}
