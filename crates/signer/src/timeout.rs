//! Finite bounds for chain I/O. Nothing is retried; an expired bound is reported to the
//! caller as [`CosignError::NetworkTimeout`].

use cosign_primitives::{CosignError, Result};
use std::{future::Future, time::Duration};
use tracing::warn;

pub async fn with_timeout<Fut, T>(operation: &str, after: Duration, fut: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                operation = %operation,
                timeout_ms = %after.as_millis(),
                "Chain request timed out"
            );
            Err(CosignError::NetworkTimeout {
                operation: operation.to_string(),
                after,
            })
        }
    }
}
