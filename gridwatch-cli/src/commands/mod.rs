//! CLI Commands
//!
//! One module per operation. Each prints a single plain result line to
//! stdout so the output can be piped into scripts.

pub mod members;
pub mod queue;
pub mod raw;
pub mod rebalance;
pub mod regions;

use anyhow::Result;
use gridwatch_core::{BridgeClient, Mode};
use gridwatch_rebalancer::Detector;

/// Everything a command needs to reach the cluster
pub struct Context {
    pub client: BridgeClient,
    pub detector: Detector,
    pub host: String,
    pub port: u16,
    pub verbose: bool,
}

/// The operation selected on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Raw { mode: Mode, object_path: String },
    MemberCount,
    Regions,
    Rebalance { region: String },
    QueueSize { queue: String },
}

impl Operation {
    pub async fn run(&self, ctx: &Context) -> Result<()> {
        match self {
            Operation::Raw { mode, object_path } => raw::run(ctx, *mode, object_path).await,
            Operation::MemberCount => members::run(ctx).await,
            Operation::Regions => regions::run(ctx).await,
            Operation::Rebalance { region } => rebalance::run(ctx, region).await,
            Operation::QueueSize { queue } => queue::run(ctx, queue).await,
        }
    }
}
