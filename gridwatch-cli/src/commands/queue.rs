//! Queue Size Command

use super::Context;
use anyhow::{Context as _, Result};

/// Print the total outstanding events in an async event queue
pub async fn run(ctx: &Context, queue: &str) -> Result<()> {
    let depth = ctx
        .client
        .queue_depth(&ctx.host, ctx.port, queue)
        .await
        .with_context(|| format!("Failed to read size of queue {}", queue))?;

    println!("{}", depth);
    Ok(())
}
