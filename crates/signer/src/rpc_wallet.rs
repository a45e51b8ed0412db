//! Extension-managed keys reached through an EIP-1193 style JSON-RPC endpoint. The wallet
//! holds the key and prompts the user; this side only forwards requests.

use crate::{
    bridge::{ChainQuery, ChainState, RawCall, SignerBridge},
    chain::{read, rpc_error},
    config::ChainConfig,
};
use alloy_dyn_abi::TypedData;
use alloy_primitives::{Address, Bytes, Signature, TxHash};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types_eth::{TransactionInput, TransactionRequest};
use async_trait::async_trait;
use cosign_primitives::{CosignError, Result};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct RpcWalletSigner {
    provider: DynProvider,
    timeout: Duration,
}

impl RpcWalletSigner {
    pub fn new(wallet_url: &str, config: &ChainConfig) -> Result<Self> {
        let url = wallet_url
            .parse()
            .map_err(|err| CosignError::Config(format!("wallet url `{wallet_url}`: {err}")))?;
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_http(url)
            .erased();
        Ok(Self {
            provider,
            timeout: config.timeout,
        })
    }

    fn parse_signature(raw: &Bytes) -> Result<Signature> {
        Signature::from_raw(raw)
            .map_err(|err| CosignError::Signer(format!("wallet returned a bad signature: {err}")))
    }
}

#[async_trait]
impl SignerBridge for RpcWalletSigner {
    async fn active_address(&self) -> Result<Address> {
        let accounts: Vec<Address> = self
            .provider
            .raw_request("eth_accounts".into(), ())
            .await
            .map_err(|err| rpc_error("eth_accounts", err))?;
        accounts.first().copied().ok_or(CosignError::SignerUnavailable)
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Signature> {
        let from = self.active_address().await?;
        debug!(%from, "requesting personal_sign");
        let raw: Bytes = self
            .provider
            .raw_request("personal_sign".into(), (Bytes::copy_from_slice(message), from))
            .await
            .map_err(|err| rpc_error("personal_sign", err))?;
        Self::parse_signature(&raw)
    }

    async fn sign_typed_data(&self, typed_data: &TypedData) -> Result<Signature> {
        let from = self.active_address().await?;
        let payload = serde_json::to_string(typed_data)
            .map_err(|err| CosignError::Signer(format!("typed data: {err}")))?;
        debug!(%from, primary_type = %typed_data.primary_type, "requesting eth_signTypedData_v4");
        let raw: Bytes = self
            .provider
            .raw_request("eth_signTypedData_v4".into(), (from, payload))
            .await
            .map_err(|err| rpc_error("eth_signTypedData_v4", err))?;
        Self::parse_signature(&raw)
    }

    /// Waits for the user to approve; no bound applies to the prompt.
    async fn send_raw_call(&self, call: RawCall) -> Result<TxHash> {
        let from = self.active_address().await?;
        let tx = TransactionRequest::default()
            .from(from)
            .to(call.to)
            .value(call.value)
            .input(TransactionInput::both(call.data));
        let tx_hash: TxHash = self
            .provider
            .raw_request("eth_sendTransaction".into(), (tx,))
            .await
            .map_err(|err| rpc_error("eth_sendTransaction", err))?;
        info!(%from, to = %call.to, %tx_hash, "Transaction broadcast by wallet");
        Ok(tx_hash)
    }

    async fn read_chain_state(&self, query: ChainQuery) -> Result<ChainState> {
        read(&self.provider, query, self.timeout).await
    }
}
