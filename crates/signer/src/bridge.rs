use alloy_dyn_abi::TypedData;
use alloy_primitives::{Address, B256, Bytes, Log, Signature, TxHash, U256};
use async_trait::async_trait;
use cosign_primitives::{CosignError, Result};

/// A plain transaction sent from the active account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCall {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

/// Read-only chain queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainQuery {
    Balance(Address),
    Code(Address),
    Nonce(Address),
    Call { to: Address, data: Bytes },
    Receipt(TxHash),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainState {
    Balance(U256),
    Code(Bytes),
    Nonce(u64),
    Call(Bytes),
    /// `None` while the transaction is not mined.
    Receipt(Option<ReceiptStatus>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptStatus {
    pub tx_hash: TxHash,
    pub success: bool,
    pub block_number: Option<u64>,
    pub logs: Vec<Log>,
}

/// Uniform surface over embedded keys and extension-managed wallets.
///
/// Every method may suspend on network I/O or on the user approving a prompt. Methods
/// fail with `SignerUnavailable` when there is no active session and `SignerRejected`
/// when the user declines. Implementations never cache or persist key material.
#[async_trait]
pub trait SignerBridge: Send + Sync {
    async fn active_address(&self) -> Result<Address>;

    /// EIP-191 personal message signature.
    async fn sign_message(&self, message: &[u8]) -> Result<Signature>;

    /// EIP-712 signature. Exactly one signature is produced per request.
    async fn sign_typed_data(&self, typed_data: &TypedData) -> Result<Signature>;

    /// Broadcasts a call from the active account and returns its hash without waiting for
    /// inclusion.
    async fn send_raw_call(&self, call: RawCall) -> Result<TxHash>;

    async fn read_chain_state(&self, query: ChainQuery) -> Result<ChainState>;
}

impl ChainState {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Balance(_) => "balance",
            Self::Code(_) => "code",
            Self::Nonce(_) => "nonce",
            Self::Call(_) => "call",
            Self::Receipt(_) => "receipt",
        }
    }
}

fn unexpected(expected: &str, state: &ChainState) -> CosignError {
    CosignError::Chain(format!("expected a {expected} answer, got {}", state.kind()))
}

/// Typed chain reads on top of [`SignerBridge::read_chain_state`].
#[async_trait]
pub trait ChainReadExt: SignerBridge {
    async fn balance(&self, address: Address) -> Result<U256> {
        match self.read_chain_state(ChainQuery::Balance(address)).await? {
            ChainState::Balance(balance) => Ok(balance),
            other => Err(unexpected("balance", &other)),
        }
    }

    async fn code(&self, address: Address) -> Result<Bytes> {
        match self.read_chain_state(ChainQuery::Code(address)).await? {
            ChainState::Code(code) => Ok(code),
            other => Err(unexpected("code", &other)),
        }
    }

    async fn account_nonce(&self, address: Address) -> Result<u64> {
        match self.read_chain_state(ChainQuery::Nonce(address)).await? {
            ChainState::Nonce(nonce) => Ok(nonce),
            other => Err(unexpected("nonce", &other)),
        }
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        match self.read_chain_state(ChainQuery::Call { to, data }).await? {
            ChainState::Call(output) => Ok(output),
            other => Err(unexpected("call", &other)),
        }
    }

    async fn receipt(&self, tx_hash: B256) -> Result<Option<ReceiptStatus>> {
        match self.read_chain_state(ChainQuery::Receipt(tx_hash)).await? {
            ChainState::Receipt(receipt) => Ok(receipt),
            other => Err(unexpected("receipt", &other)),
        }
    }
}

impl<T: SignerBridge + ?Sized> ChainReadExt for T {}
