//! JSON bodies of the transaction service v1 API.

use crate::store::SafeInfo;
use alloy_primitives::{Address, B256, Bytes, U256};
use cosign_primitives::{
    Confirmation, CosignError, Operation, OriginMetadata, PendingTransactionRecord, Proposal,
    Result, SafeTransaction, address::serde_checksummed,
};
use jiff::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProposeRequest {
    #[serde(with = "serde_checksummed")]
    safe: Address,
    #[serde(with = "serde_checksummed")]
    to: Address,
    value: String,
    data: Option<Bytes>,
    operation: u8,
    safe_tx_gas: String,
    base_gas: String,
    gas_price: String,
    #[serde(with = "serde_checksummed")]
    gas_token: Address,
    #[serde(with = "serde_checksummed")]
    refund_receiver: Address,
    nonce: u64,
    contract_transaction_hash: B256,
    #[serde(with = "serde_checksummed")]
    sender: Address,
    signature: Bytes,
    origin: Option<String>,
}

impl From<&Proposal> for ProposeRequest {
    fn from(proposal: &Proposal) -> Self {
        let tx = &proposal.transaction;
        Self {
            safe: proposal.safe,
            to: tx.to,
            value: tx.value.to_string(),
            data: (!tx.data.is_empty()).then(|| tx.data.clone()),
            operation: tx.operation.into(),
            safe_tx_gas: tx.safe_tx_gas.to_string(),
            base_gas: tx.base_gas.to_string(),
            gas_price: tx.gas_price.to_string(),
            gas_token: tx.gas_token,
            refund_receiver: tx.refund_receiver,
            nonce: tx.nonce,
            contract_transaction_hash: proposal.safe_tx_hash,
            sender: proposal.sender,
            signature: proposal.signature.clone(),
            origin: tx.origin.to_origin(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ConfirmRequest<'a> {
    pub(crate) signature: &'a Bytes,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Page<T> {
    pub(crate) results: Vec<T>,
    /// Absolute URL of the following page.
    #[serde(default)]
    pub(crate) next: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfirmationResponse {
    owner: Address,
    #[serde(default)]
    submission_date: Option<Timestamp>,
    #[serde(default)]
    signature: Option<Bytes>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MultisigTransactionResponse {
    safe: Address,
    to: Address,
    #[serde(default, deserialize_with = "lenient_u256")]
    value: U256,
    #[serde(default)]
    data: Option<Bytes>,
    operation: u8,
    #[serde(default, deserialize_with = "lenient_u256")]
    safe_tx_gas: U256,
    #[serde(default, deserialize_with = "lenient_u256")]
    base_gas: U256,
    #[serde(default, deserialize_with = "lenient_u256")]
    gas_price: U256,
    #[serde(default)]
    gas_token: Option<Address>,
    #[serde(default)]
    refund_receiver: Option<Address>,
    #[serde(deserialize_with = "lenient_u64")]
    nonce: u64,
    safe_tx_hash: B256,
    #[serde(default)]
    proposer: Option<Address>,
    #[serde(default)]
    is_executed: bool,
    #[serde(default)]
    submission_date: Option<Timestamp>,
    #[serde(default)]
    transaction_hash: Option<B256>,
    #[serde(default)]
    origin: Option<String>,
    #[serde(default)]
    confirmations: Option<Vec<ConfirmationResponse>>,
}

impl TryFrom<MultisigTransactionResponse> for PendingTransactionRecord {
    type Error = CosignError;

    fn try_from(resp: MultisigTransactionResponse) -> Result<Self> {
        let operation = Operation::try_from(resp.operation).map_err(CosignError::Relay)?;
        let transaction = SafeTransaction {
            to: resp.to,
            value: resp.value,
            data: resp.data.unwrap_or_default(),
            operation,
            safe_tx_gas: resp.safe_tx_gas,
            base_gas: resp.base_gas,
            gas_price: resp.gas_price,
            gas_token: resp.gas_token.unwrap_or_default(),
            refund_receiver: resp.refund_receiver.unwrap_or_default(),
            nonce: resp.nonce,
            origin: OriginMetadata::parse_or_default(resp.origin.as_deref()),
        };

        let confirmations = resp
            .confirmations
            .unwrap_or_default()
            .into_iter()
            .filter_map(|c| match c.signature {
                Some(signature) => Some(Confirmation {
                    owner: c.owner,
                    signature,
                    submitted_at: c.submission_date,
                }),
                None => {
                    warn!(owner = %c.owner, safe_tx_hash = %resp.safe_tx_hash, "skipping confirmation without signature");
                    None
                }
            })
            .collect();

        Ok(Self {
            safe: resp.safe,
            transaction,
            safe_tx_hash: resp.safe_tx_hash,
            confirmations,
            executed: resp.is_executed,
            proposer: resp.proposer,
            submitted_at: resp.submission_date,
            execution_tx_hash: resp.transaction_hash,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SafeInfoResponse {
    address: Address,
    #[serde(deserialize_with = "lenient_u64")]
    nonce: u64,
    #[serde(deserialize_with = "lenient_u64")]
    threshold: u64,
    owners: Vec<Address>,
    #[serde(default)]
    version: Option<String>,
}

impl From<SafeInfoResponse> for SafeInfo {
    fn from(resp: SafeInfoResponse) -> Self {
        Self {
            address: resp.address,
            nonce: resp.nonce,
            threshold: resp.threshold,
            owners: resp.owners,
            version: resp.version,
        }
    }
}

/// The service has served integer fields both as JSON numbers and as decimal strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    String(String),
}

fn lenient_u256<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(U256::ZERO),
        Some(NumberOrString::Number(n)) => Ok(U256::from(n)),
        Some(NumberOrString::String(s)) => s.parse().map_err(serde::de::Error::custom),
    }
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
