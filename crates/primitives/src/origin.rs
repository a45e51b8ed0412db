//! Application metadata stored in the relay store's free-form `origin` field.
//!
//! cosign writes a tagged JSON object. Origins written by other Safe clients (plain text
//! or objects without a `type` key) are foreign and read as [`OriginMetadata::Default`];
//! an object that claims a known `type` but does not match its schema is malformed.

use crate::error::{CosignError, Result};
use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OriginMetadata {
    /// No annotation; the Safe threshold applies.
    #[default]
    Default,
    /// Off-chain override of the signatures required before cosign offers execution.
    /// The contract never enforces it.
    CustomThreshold { required_signatures: u64 },
    /// Rejection of the transaction with this hash, sharing its nonce.
    RejectionOf { safe_tx_hash: B256 },
    /// Free labeling by the proposing application.
    Labeled { app_name: String, category: String },
}

impl OriginMetadata {
    /// Serialized form for the relay store, `None` for [`OriginMetadata::Default`].
    pub fn to_origin(&self) -> Option<String> {
        match self {
            Self::Default => None,
            other => serde_json::to_string(other).ok(),
        }
    }

    /// Parses a stored origin.
    pub fn parse(origin: Option<&str>) -> Result<Self> {
        let Some(raw) = origin.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(Self::Default);
        };

        let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) else {
            return Ok(Self::Default);
        };
        if value.get("type").is_none() {
            return Ok(Self::Default);
        }

        let metadata: Self = serde_json::from_value(value)
            .map_err(|err| CosignError::MalformedOrigin(format!("{raw}: {err}")))?;
        if let Self::CustomThreshold {
            required_signatures: 0,
        } = metadata
        {
            return Err(CosignError::MalformedOrigin(format!(
                "{raw}: required signatures must be at least 1"
            )));
        }
        Ok(metadata)
    }

    /// Like [`Self::parse`], falling back to [`OriginMetadata::Default`] on malformed input.
    pub fn parse_or_default(origin: Option<&str>) -> Self {
        Self::parse(origin).unwrap_or_else(|err| {
            warn!(error = %err, "ignoring malformed origin metadata");
            Self::Default
        })
    }

    pub fn custom_threshold(&self) -> Option<u64> {
        match self {
            Self::CustomThreshold {
                required_signatures,
            } => Some(*required_signatures),
            _ => None,
        }
    }

    pub fn rejected_hash(&self) -> Option<B256> {
        match self {
            Self::RejectionOf { safe_tx_hash } => Some(*safe_tx_hash),
            _ => None,
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::RejectionOf { .. })
    }
}
