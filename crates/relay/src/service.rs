//! HTTP client for the Safe transaction service.

use crate::{
    config::RelayConfig,
    store::{RelayStore, SafeInfo},
    wire::{ConfirmRequest, MultisigTransactionResponse, Page, ProposeRequest, SafeInfoResponse},
};
use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use cosign_primitives::{
    CosignError, PendingTransactionRecord, Proposal, Result, SafeTxHash, checksummed,
};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Upper bound on pages followed when listing the pending set.
const MAX_PAGES: usize = 50;

/// [`RelayStore`] backed by the transaction service REST API.
///
/// Requests are bounded by the configured timeout and never retried; a failure is
/// reported to the caller, who decides whether to trigger the action again.
#[derive(Debug, Clone)]
pub struct TransactionService {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl TransactionService {
    pub fn new(config: &RelayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| CosignError::Config(format!("relay client: {err}")))?;
        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|key| !key.is_empty()),
            timeout: config.timeout,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.base_url)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    fn transport_error(&self, operation: &str, err: reqwest::Error) -> CosignError {
        if err.is_timeout() {
            warn!(operation, timeout = ?self.timeout, "relay request timed out");
            CosignError::NetworkTimeout {
                operation: operation.to_string(),
                after: self.timeout,
            }
        } else {
            CosignError::Relay(format!("{operation}: {err}"))
        }
    }

    /// Sends a creation request. Any 2xx is success, including an empty body.
    async fn post<B: Serialize + ?Sized>(&self, operation: &str, url: &str, body: &B) -> Result<()> {
        let resp = self
            .request(reqwest::Method::POST, url)
            .json(body)
            .send()
            .await
            .map_err(|err| self.transport_error(operation, err))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|err| self.transport_error(operation, err))?;
        if !status.is_success() {
            warn!(operation, status = status.as_u16(), body = %text, "relay store refused request");
            return Err(CosignError::ProposalRejected {
                status: status.as_u16(),
                body: text,
            });
        }
        debug!(operation, status = status.as_u16(), "relay store accepted request");
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, operation: &str, url: &str) -> Result<T> {
        let resp = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|err| self.transport_error(operation, err))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|err| self.transport_error(operation, err))?;
        if !status.is_success() {
            return Err(CosignError::Relay(format!("{operation}: status {status}: {text}")));
        }
        serde_json::from_str(&text)
            .map_err(|err| CosignError::Relay(format!("{operation}: malformed response: {err}")))
    }
}

#[async_trait]
impl RelayStore for TransactionService {
    async fn propose(&self, proposal: &Proposal) -> Result<()> {
        let url = self.url(&format!(
            "safes/{}/multisig-transactions/",
            checksummed(&proposal.safe)
        ));
        info!(
            safe = %proposal.safe,
            nonce = proposal.transaction.nonce,
            safe_tx_hash = %proposal.safe_tx_hash,
            "proposing transaction"
        );
        self.post("propose", &url, &ProposeRequest::from(proposal)).await
    }

    async fn confirm(&self, safe_tx_hash: SafeTxHash, signature: &Bytes) -> Result<()> {
        let url = self.url(&format!("multisig-transactions/{safe_tx_hash}/confirmations/"));
        info!(%safe_tx_hash, "submitting confirmation");
        self.post("confirm", &url, &ConfirmRequest { signature }).await
    }

    async fn pending(&self, safe: Address) -> Result<Vec<PendingTransactionRecord>> {
        let mut url = Some(self.url(&format!(
            "safes/{}/multisig-transactions/?executed=false",
            checksummed(&safe)
        )));
        let mut records = Vec::new();
        let mut pages = 0;
        while let Some(next) = url {
            if pages == MAX_PAGES {
                warn!(%safe, pages, count = records.len(), "pending set truncated at page limit");
                break;
            }
            let page: Page<MultisigTransactionResponse> = self.get("pending", &next).await?;
            for resp in page.results {
                records.push(PendingTransactionRecord::try_from(resp)?);
            }
            url = page.next;
            pages += 1;
        }
        debug!(%safe, count = records.len(), pages, "fetched pending transactions");
        Ok(records)
    }

    async fn transaction(&self, safe_tx_hash: SafeTxHash) -> Result<PendingTransactionRecord> {
        let url = self.url(&format!("multisig-transactions/{safe_tx_hash}/"));
        let resp: MultisigTransactionResponse = self.get("transaction", &url).await?;
        resp.try_into()
    }

    async fn safe_info(&self, safe: Address) -> Result<SafeInfo> {
        let url = self.url(&format!("safes/{}/", checksummed(&safe)));
        let resp: SafeInfoResponse = self.get("safe_info", &url).await?;
        Ok(resp.into())
    }
}
