//! Session metrics.

use metrics::{Counter, Histogram};
use metrics_derive::Metrics;

#[derive(Metrics, Clone)]
#[metrics(scope = "cosign")]
pub struct CosignMetrics {
    /// Proposals accepted by the relay store
    pub proposals: Counter,

    /// Confirmations accepted by the relay store
    pub confirmations: Counter,

    /// Executions broadcast to the chain
    pub executions: Counter,

    /// Executions that failed on chain or before broadcast
    pub execution_failures: Counter,

    /// Recomputed hashes that did not match the stored hash
    pub hash_mismatches: Counter,

    /// Confirmation attempts refused because the owner already signed
    pub double_sign_rejections: Counter,

    /// Relay store round-trip latency in seconds
    pub relay_latency_seconds: Histogram,
}

impl CosignMetrics {
    #[inline]
    pub fn record_proposal(&self) {
        self.proposals.increment(1);
    }

    #[inline]
    pub fn record_confirmation(&self) {
        self.confirmations.increment(1);
    }

    #[inline]
    pub fn record_execution(&self) {
        self.executions.increment(1);
    }

    #[inline]
    pub fn record_execution_failure(&self) {
        self.execution_failures.increment(1);
    }

    #[inline]
    pub fn record_hash_mismatch(&self) {
        self.hash_mismatches.increment(1);
    }

    #[inline]
    pub fn record_double_sign(&self) {
        self.double_sign_rejections.increment(1);
    }

    #[inline]
    pub fn record_relay_latency(&self, duration_secs: f64) {
        self.relay_latency_seconds.record(duration_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_a_noop() {
        let metrics = CosignMetrics::default();
        metrics.record_proposal();
        metrics.record_relay_latency(0.25);
        assert!(format!("{metrics:?}").contains("CosignMetrics"));
    }
}
