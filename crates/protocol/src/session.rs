//! The session context passed explicitly through every operation: one signer bridge, one
//! relay store, configuration, the in-flight markers and the event channel.

use crate::{
    config::CosignConfig,
    events::{CosignEvent, EVENT_CAPACITY},
    guard::InFlight,
    metrics::CosignMetrics,
};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use cosign_contracts::ISafe;
use cosign_primitives::{CosignError, Result, SafeVersion, Wallet};
use cosign_relay::{RelayStore, TransactionService};
use cosign_signer::{ChainReadExt, SignerBridge};
use std::{future::Future, sync::Arc, time::Instant};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

pub struct Session {
    pub(crate) signer: Arc<dyn SignerBridge>,
    pub(crate) relay: Arc<dyn RelayStore>,
    pub(crate) config: CosignConfig,
    pub(crate) in_flight: InFlight,
    pub(crate) metrics: CosignMetrics,
    events: broadcast::Sender<CosignEvent>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("chain_id", &self.config.chain.id)
            .field("relay", &self.config.relay.url)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(
        signer: Arc<dyn SignerBridge>,
        relay: Arc<dyn RelayStore>,
        config: CosignConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            signer,
            relay,
            config,
            in_flight: InFlight::default(),
            metrics: CosignMetrics::default(),
            events,
        }
    }

    /// Session talking to the hosted transaction service named in `config`.
    pub fn connect(signer: Arc<dyn SignerBridge>, config: CosignConfig) -> Result<Self> {
        let relay = TransactionService::new(&config.relay)?;
        Ok(Self::new(signer, Arc::new(relay), config))
    }

    pub fn config(&self) -> &CosignConfig {
        &self.config
    }

    pub fn signer(&self) -> &Arc<dyn SignerBridge> {
        &self.signer
    }

    pub fn relay(&self) -> &Arc<dyn RelayStore> {
        &self.relay
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CosignEvent> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: CosignEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Times a relay store call.
    pub(crate) async fn relay_call<T, Fut>(&self, fut: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let started = Instant::now();
        let result = fut.await;
        self.metrics.record_relay_latency(started.elapsed().as_secs_f64());
        result
    }

    /// True if contract code exists at `address`.
    pub async fn is_deployed(&self, address: Address) -> Result<bool> {
        Ok(!self.signer.code(address).await?.is_empty())
    }

    /// Reads owners, threshold, nonce and version from the chain. Falls back to the relay
    /// store's indexed state when the chain reads fail for reasons other than a missing
    /// contract.
    pub async fn load_wallet(&self, address: Address) -> Result<Wallet> {
        match self.load_wallet_from_chain(address).await {
            Ok(wallet) => Ok(wallet),
            Err(err @ CosignError::NotDeployed(_)) => Err(err),
            Err(chain_err) => {
                warn!(safe = %address, error = %chain_err, "chain read failed, using relay store state");
                let info = self
                    .relay_call(self.relay.safe_info(address))
                    .await
                    .map_err(|_| chain_err)?;
                let version = info
                    .version
                    .as_deref()
                    .map(str::parse)
                    .transpose()?
                    .unwrap_or_default();
                Wallet::new(
                    info.address,
                    self.config.chain.id,
                    version,
                    info.owners,
                    info.threshold,
                    info.nonce,
                )
            }
        }
    }

    async fn load_wallet_from_chain(&self, address: Address) -> Result<Wallet> {
        if !self.is_deployed(address).await? {
            return Err(CosignError::NotDeployed(address));
        }

        let (owners, threshold, nonce, version) = futures::try_join!(
            self.safe_call(address, ISafe::getOwnersCall {}),
            self.safe_call(address, ISafe::getThresholdCall {}),
            self.safe_call(address, ISafe::nonceCall {}),
            self.safe_call(address, ISafe::VERSIONCall {}),
        )?;
        let threshold = to_u64("threshold", threshold)?;
        let nonce = to_u64("nonce", nonce)?;
        let version: SafeVersion = version.parse()?;

        let wallet = Wallet::new(address, self.config.chain.id, version, owners, threshold, nonce)?;
        info!(
            safe = %address,
            owners = wallet.owners().len(),
            threshold,
            nonce,
            %version,
            "Loaded Safe"
        );
        Ok(wallet)
    }

    async fn safe_call<C: SolCall + Send>(&self, safe: Address, call: C) -> Result<C::Return> {
        let output = self.signer.call(safe, Bytes::from(call.abi_encode())).await?;
        debug!(safe = %safe, function = C::SIGNATURE, "Safe read");
        C::abi_decode_returns(&output)
            .map_err(|err| CosignError::Chain(format!("{}: {err}", C::SIGNATURE)))
    }
}

fn to_u64(field: &str, value: U256) -> Result<u64> {
    u64::try_from(value).map_err(|_| CosignError::Chain(format!("{field} {value} out of range")))
}
