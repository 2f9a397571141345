//! Rebalance Convergence Detector
//!
//! Bucket counts per member and region only change while the cluster is
//! moving buckets between members. Two snapshots taken a few seconds apart
//! are therefore identical once rebalancing has finished, and the sum of
//! their per-key differences (the churn) drops to zero.
//!
//! Churn is computed from the later snapshot's point of view: every key in
//! the later snapshot contributes `|before - after|`, with a key missing
//! from the earlier snapshot counted as 0 buckets before. A key present in
//! the earlier snapshot but absent from the later one (a member that
//! dropped out of the region entirely) contributes nothing. That asymmetry
//! is kept as-is; [`RebalanceReport::vanished`] reports how many such keys
//! were seen so callers can tell.

use crate::config::DetectorConfig;
use gridwatch_core::{BridgeClient, BucketSnapshot, Result};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Sum of absolute bucket-count changes for every key in `next`.
///
/// Keys only present in `first` contribute 0. The sum saturates at
/// `u64::MAX`, which still reads as not converged.
pub fn rebalance_churn(first: &BucketSnapshot, next: &BucketSnapshot) -> u64 {
    next.iter()
        .map(|(key, after)| first.get(key).unwrap_or(0).abs_diff(after))
        .fold(0u64, u64::saturating_add)
}

/// Outcome of one convergence check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebalanceReport {
    /// Buckets moved between the two snapshots; 0 means converged
    pub churn: u64,
    /// Time between the two snapshots
    pub elapsed: Duration,
    /// Keys in the later snapshot
    pub compared: usize,
    /// Keys only present in the earlier snapshot (not counted in churn)
    pub vanished: usize,
}

impl RebalanceReport {
    pub fn compare(first: &BucketSnapshot, next: &BucketSnapshot) -> Self {
        let vanished = first
            .iter()
            .filter(|(key, _)| next.get(key).is_none())
            .count();

        Self {
            churn: rebalance_churn(first, next),
            elapsed: next.taken_at().saturating_duration_since(first.taken_at()),
            compared: next.len(),
            vanished,
        }
    }

    /// No bucket moved between the snapshots
    pub fn is_converged(&self) -> bool {
        self.churn == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "churn {} over {:?} across {} member regions ({} vanished)",
            self.churn, self.elapsed, self.compared, self.vanished
        )
    }
}

/// Drives a single convergence check against a live cluster
#[derive(Debug, Clone, Default)]
pub struct Detector {
    config: DetectorConfig,
}

impl Detector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Snapshot, wait the settle interval, snapshot again, compare.
    ///
    /// The wait is not cancelled early. Bridge errors from either snapshot
    /// propagate unchanged.
    #[instrument(skip(self, client))]
    pub async fn check(
        &self,
        client: &BridgeClient,
        host: &str,
        port: u16,
        region: &str,
    ) -> Result<RebalanceReport> {
        let first = client.snapshot_buckets(host, port, region).await?;
        debug!(
            entries = first.len(),
            interval = ?self.config.settle_interval,
            "First bucket snapshot taken, waiting"
        );

        tokio::time::sleep(self.config.settle_interval).await;

        let next = client.snapshot_buckets(host, port, region).await?;
        let report = RebalanceReport::compare(&first, &next);

        info!(
            churn = report.churn,
            converged = report.is_converged(),
            vanished = report.vanished,
            "Rebalance check complete"
        );

        Ok(report)
    }
}
