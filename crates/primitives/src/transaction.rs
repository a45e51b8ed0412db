use crate::origin::OriginMetadata;
use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// How the Safe invokes `to`. cosign only ever proposes [`Operation::Call`]; delegate
/// calls are decoded so foreign proposals can be displayed and re-hashed faithfully.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Operation {
    #[default]
    Call,
    DelegateCall,
}

impl From<Operation> for u8 {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Call => 0,
            Operation::DelegateCall => 1,
        }
    }
}

impl TryFrom<u8> for Operation {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Call),
            1 => Ok(Self::DelegateCall),
            other => Err(format!("unknown operation {other}")),
        }
    }
}

/// An intended Safe state change.
///
/// Every field except `origin` feeds the transaction hash. Two transactions with the same
/// nonce are mutually exclusive: executing one invalidates the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeTransaction {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: Operation,
    pub safe_tx_gas: U256,
    pub base_gas: U256,
    pub gas_price: U256,
    pub gas_token: Address,
    pub refund_receiver: Address,
    pub nonce: u64,
    /// Application metadata carried next to the transaction, not hashed.
    #[serde(default)]
    pub origin: OriginMetadata,
}

impl SafeTransaction {
    /// A plain call with zeroed gas accounting.
    pub fn call(to: Address, value: U256, data: impl Into<Bytes>, nonce: u64) -> Self {
        Self {
            to,
            value,
            data: data.into(),
            nonce,
            ..Default::default()
        }
    }

    pub fn with_origin(mut self, origin: OriginMetadata) -> Self {
        self.origin = origin;
        self
    }

    /// Applies refund-style gas accounting.
    pub fn with_gas(
        mut self,
        safe_tx_gas: U256,
        base_gas: U256,
        gas_price: U256,
        gas_token: Address,
        refund_receiver: Address,
    ) -> Self {
        self.safe_tx_gas = safe_tx_gas;
        self.base_gas = base_gas;
        self.gas_price = gas_price;
        self.gas_token = gas_token;
        self.refund_receiver = refund_receiver;
        self
    }

    /// Zero-value, empty-data self call: the shape used to burn a nonce.
    pub fn is_rejection_shape(&self, safe: Address) -> bool {
        self.to == safe
            && self.value.is_zero()
            && self.data.is_empty()
            && self.operation == Operation::Call
    }
}
