//! gridwatch Rebalancer Library
//!
//! Detects whether a cluster-wide bucket rebalance has converged by
//! comparing two bucket-count snapshots taken a settle interval apart.
//! The comparison itself is pure; the [`Detector`] only adds the two
//! bridge queries and the wait between them. Watching convergence over
//! time is left to the caller.

pub mod config;
pub mod detector;

pub use config::{ConfigError, DetectorConfig};
pub use detector::{rebalance_churn, Detector, RebalanceReport};
