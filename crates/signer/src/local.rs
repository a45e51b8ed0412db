//! Embedded custody: a key held in process, broadcasting through an HTTP provider.

use crate::{
    bridge::{ChainQuery, ChainState, RawCall, SignerBridge},
    chain::{read, rpc_error},
    config::ChainConfig,
    timeout::with_timeout,
};
use alloy_dyn_abi::TypedData;
use alloy_network::EthereumWallet;
use alloy_primitives::{Address, Signature, TxHash};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use cosign_primitives::{CosignError, Result};
use std::{fmt, time::Duration};
use tracing::info;

pub struct LocalKeySigner {
    signer: PrivateKeySigner,
    provider: DynProvider,
    timeout: Duration,
}

impl fmt::Debug for LocalKeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalKeySigner")
            .field("address", &self.signer.address())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl LocalKeySigner {
    /// Create a signer for `config.rpc_url`. The provider connects lazily, so no request is
    /// made here.
    pub fn new(signer: PrivateKeySigner, config: &ChainConfig) -> Result<Self> {
        let url = config
            .rpc_url
            .parse()
            .map_err(|err| CosignError::Config(format!("rpc url `{}`: {err}", config.rpc_url)))?;
        let signer = signer.with_chain_id(Some(config.id));
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer.clone()))
            .connect_http(url)
            .erased();

        Ok(Self {
            signer,
            provider,
            timeout: config.timeout,
        })
    }

    /// Parses a hex private key.
    pub fn from_hex(key: &str, config: &ChainConfig) -> Result<Self> {
        let signer = key
            .parse::<PrivateKeySigner>()
            .map_err(|err| CosignError::Config(format!("private key: {err}")))?;
        Self::new(signer, config)
    }
}

fn signer_error(err: alloy_signer::Error) -> CosignError {
    CosignError::Signer(err.to_string())
}

#[async_trait]
impl SignerBridge for LocalKeySigner {
    async fn active_address(&self) -> Result<Address> {
        Ok(self.signer.address())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Signature> {
        self.signer.sign_message(message).await.map_err(signer_error)
    }

    async fn sign_typed_data(&self, typed_data: &TypedData) -> Result<Signature> {
        let hash = typed_data
            .eip712_signing_hash()
            .map_err(|err| CosignError::Signer(format!("typed data: {err}")))?;
        self.signer.sign_hash(&hash).await.map_err(signer_error)
    }

    async fn send_raw_call(&self, call: RawCall) -> Result<TxHash> {
        let tx = TransactionRequest::default()
            .from(self.signer.address())
            .to(call.to)
            .value(call.value)
            .input(call.data.into());

        let tx_hash = with_timeout("eth_sendRawTransaction", self.timeout, async {
            let pending = self
                .provider
                .send_transaction(tx)
                .await
                .map_err(|err| rpc_error("eth_sendRawTransaction", err))?;
            Ok(*pending.tx_hash())
        })
        .await?;

        info!(
            from = %self.signer.address(),
            to = %call.to,
            %tx_hash,
            "Transaction broadcast"
        );
        Ok(tx_hash)
    }

    async fn read_chain_state(&self, query: ChainQuery) -> Result<ChainState> {
        read(&self.provider, query, self.timeout).await
    }
}
