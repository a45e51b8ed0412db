//! Execution: rebuilding a confirmed transaction from the relay store's authoritative
//! copy, checking it, and submitting `execTransaction` through the signer bridge.

use crate::{
    builder::build_rejection,
    events::CosignEvent,
    quorum::{quorum_status, required_signatures},
    session::Session,
};
use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_sol_types::{SolCall, SolEvent};
use cosign_contracts::{ISafe, SafeRevert};
use cosign_primitives::{
    Confirmation, CosignError, OwnerAction, PendingTransactionRecord, Result, SafeTransaction,
    SafeTxHash, Wallet, compute_hash,
};
use cosign_signer::{ChainReadExt, RawCall, ReceiptStatus};
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

/// Outcome of an execution that was mined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReceipt {
    pub safe_tx_hash: SafeTxHash,
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

/// Signatures of current owners over `safe_tx_hash`, one per owner, ordered by owner
/// address ascending and packed as `execTransaction` expects.
pub fn pack_signatures(
    confirmations: &[&Confirmation],
    safe_tx_hash: SafeTxHash,
) -> Result<(Vec<Address>, Bytes)> {
    let mut sorted = confirmations.to_vec();
    sorted.sort_by_key(|c| c.owner);
    sorted.dedup_by_key(|c| c.owner);

    let mut packed = Vec::with_capacity(sorted.len() * cosign_primitives::SIGNATURE_LEN);
    for confirmation in &sorted {
        confirmation.verify(safe_tx_hash)?;
        packed.extend_from_slice(&confirmation.ecdsa_bytes()?);
    }
    Ok((sorted.iter().map(|c| c.owner).collect(), packed.into()))
}

/// Rebuilds the transaction from fetched fields. Rejections go through the rejection
/// builder; every gas field present in the record is applied on top.
fn rebuild(wallet: &Wallet, record: &PendingTransactionRecord) -> Result<SafeTransaction> {
    let fetched = &record.transaction;
    let base = if fetched.origin.is_rejection() {
        build_rejection(wallet, fetched.nonce)?
    } else {
        let mut tx = SafeTransaction::call(fetched.to, fetched.value, fetched.data.clone(), fetched.nonce);
        tx.operation = fetched.operation;
        tx
    };
    Ok(base
        .with_gas(
            fetched.safe_tx_gas,
            fetched.base_gas,
            fetched.gas_price,
            fetched.gas_token,
            fetched.refund_receiver,
        )
        .with_origin(fetched.origin.clone()))
}

fn exec_call(tx: &SafeTransaction, signatures: Bytes) -> Bytes {
    ISafe::execTransactionCall {
        to: tx.to,
        value: tx.value,
        data: tx.data.clone(),
        operation: tx.operation.into(),
        safeTxGas: tx.safe_tx_gas,
        baseGas: tx.base_gas,
        gasPrice: tx.gas_price,
        gasToken: tx.gas_token,
        refundReceiver: tx.refund_receiver,
        signatures,
    }
    .abi_encode()
    .into()
}

/// Turns a broadcast failure that carries a revert into an execution failure.
fn translate_revert(err: CosignError) -> CosignError {
    let reason = match &err {
        CosignError::Chain(message) | CosignError::Signer(message) => SafeRevert::find_in(message)
            .map(|revert| revert.to_string())
            .or_else(|| message.contains("revert").then(|| message.clone())),
        _ => None,
    };
    match reason {
        Some(reason) => CosignError::OnchainExecutionFailed {
            reason,
            below_onchain_threshold: false,
        },
        None => err,
    }
}

fn receipt_failure(safe: Address, safe_tx_hash: SafeTxHash, receipt: &ReceiptStatus) -> Option<String> {
    if !receipt.success {
        return Some(format!("transaction {} reverted", receipt.tx_hash));
    }
    receipt
        .logs
        .iter()
        .filter(|log| log.address == safe)
        .filter_map(|log| ISafe::ExecutionFailure::decode_log_data(&log.data).ok())
        .any(|event| event.txHash == safe_tx_hash)
        .then(|| format!("the Safe call in {} failed", receipt.tx_hash))
}

impl Session {
    /// Executes `record` and returns the on-chain transaction hash without waiting for
    /// inclusion.
    pub async fn execute(
        &self,
        wallet: &Wallet,
        record: &PendingTransactionRecord,
    ) -> Result<TxHash> {
        let _guard = self.in_flight.acquire(record.safe_tx_hash)?;
        self.submit(wallet, record).await
    }

    /// Broadcasts `execTransaction`. The caller holds the in-flight marker for `record`.
    async fn submit(&self, wallet: &Wallet, record: &PendingTransactionRecord) -> Result<TxHash> {
        let result = self.submit_inner(wallet, record).await;
        if result.is_err() {
            self.metrics.record_execution_failure();
        }
        result
    }

    async fn submit_inner(
        &self,
        wallet: &Wallet,
        record: &PendingTransactionRecord,
    ) -> Result<TxHash> {
        let fetched = self.relay_call(self.relay.transaction(record.safe_tx_hash)).await?;
        if fetched.executed || wallet.is_nonce_consumed(fetched.nonce()) {
            return Err(CosignError::NonceConsumed {
                nonce: fetched.nonce(),
                current: wallet.nonce().max(fetched.nonce().saturating_add(1)),
            });
        }

        let tx = rebuild(wallet, &fetched)?;
        self.verify_hash(record, compute_hash(&wallet.domain(), &tx))?;

        let confirmations: Vec<_> = fetched.owner_confirmations(wallet.owners()).collect();
        let (signers, signatures) = pack_signatures(&confirmations, record.safe_tx_hash)?;

        let required = required_signatures(&fetched, wallet);
        if (signers.len() as u64) < required {
            return Err(CosignError::InsufficientSignatures {
                collected: signers.len(),
                required,
            });
        }
        if quorum_status(&fetched, wallet).below_onchain_threshold() {
            return Err(CosignError::OnchainExecutionFailed {
                reason: format!(
                    "{} of {} signatures the Safe enforces",
                    signers.len(),
                    wallet.threshold()
                ),
                below_onchain_threshold: true,
            });
        }

        debug!(safe_tx_hash = %record.safe_tx_hash, ?signers, "Submitting execTransaction");
        let call = RawCall {
            to: wallet.address(),
            value: U256::ZERO,
            data: exec_call(&tx, signatures),
        };
        let tx_hash = self.signer.send_raw_call(call).await.map_err(translate_revert)?;

        self.metrics.record_execution();
        info!(
            safe = %wallet.address(),
            nonce = tx.nonce,
            safe_tx_hash = %record.safe_tx_hash,
            %tx_hash,
            "Executed transaction"
        );
        self.emit(CosignEvent::Executed {
            safe: wallet.address(),
            safe_tx_hash: record.safe_tx_hash,
            tx_hash,
        });
        Ok(tx_hash)
    }

    /// Executes `record`, waits for the receipt and advances `wallet` past the executed
    /// nonce. Owner changes carried by the transaction are applied to `wallet` as well.
    ///
    /// The in-flight marker is held until the receipt resolves. When the Safe reports
    /// `ExecutionFailure` the nonce is still consumed, so `wallet` advances before the
    /// error is returned; a reverted transaction leaves it untouched.
    pub async fn execute_and_wait(
        &self,
        wallet: &mut Wallet,
        record: &PendingTransactionRecord,
    ) -> Result<ExecutionReceipt> {
        let _guard = self.in_flight.acquire(record.safe_tx_hash)?;
        let tx_hash = self.submit(wallet, record).await?;
        let receipt = self.wait_for_receipt(tx_hash).await?;

        if let Some(reason) = receipt_failure(wallet.address(), record.safe_tx_hash, &receipt) {
            self.metrics.record_execution_failure();
            warn!(%tx_hash, safe_tx_hash = %record.safe_tx_hash, %reason, "Execution failed on chain");
            if receipt.success
                && let Err(err) = wallet.apply_execution(record.nonce())
            {
                warn!(error = %err, "Local Safe state out of sync, reloading");
                *wallet = self.load_wallet(wallet.address()).await?;
            }
            return Err(CosignError::OnchainExecutionFailed {
                reason,
                below_onchain_threshold: false,
            });
        }

        if let Err(err) = apply_locally(wallet, &record.transaction) {
            warn!(error = %err, "Local Safe state out of sync, reloading");
            *wallet = self.load_wallet(wallet.address()).await?;
        }

        Ok(ExecutionReceipt {
            safe_tx_hash: record.safe_tx_hash,
            tx_hash,
            block_number: receipt.block_number,
        })
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<ReceiptStatus> {
        let chain = &self.config.chain;
        let deadline = Instant::now() + chain.receipt_timeout;
        loop {
            if let Some(receipt) = self.signer.receipt(tx_hash).await? {
                return Ok(receipt);
            }
            if Instant::now() + chain.receipt_poll_interval > deadline {
                return Err(CosignError::NetworkTimeout {
                    operation: format!("receipt for {tx_hash}"),
                    after: chain.receipt_timeout,
                });
            }
            sleep(chain.receipt_poll_interval).await;
        }
    }
}

fn apply_locally(wallet: &mut Wallet, tx: &SafeTransaction) -> Result<()> {
    wallet.apply_execution(tx.nonce)?;
    if tx.to == wallet.address()
        && let Some(action) = OwnerAction::decode(&tx.data)
    {
        action.apply(wallet)?;
    }
    Ok(())
}
