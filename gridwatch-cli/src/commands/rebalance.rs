//! Rebalance Command
//!
//! Runs one convergence check and prints the churn. Zero means no bucket
//! moved during the settle interval.

use super::Context;
use crate::symbols;
use anyhow::{Context as _, Result};
use console::style;

pub async fn run(ctx: &Context, region: &str) -> Result<()> {
    let report = ctx
        .detector
        .check(&ctx.client, &ctx.host, ctx.port, region)
        .await
        .with_context(|| format!("Rebalance check for {} failed", region))?;

    println!("{}", report.churn);

    if ctx.verbose {
        let marker = if report.is_converged() {
            style(symbols::CHECK).green()
        } else {
            style(symbols::WARN).yellow()
        };
        eprintln!("{} {}", marker, style(report.summary()).dim());
    }

    Ok(())
}
