//! Regions Command
//!
//! Prints every region's full path on one line, space separated, in the
//! order the bridge listed them.

use super::Context;
use anyhow::{Context as _, Result};

pub async fn run(ctx: &Context) -> Result<()> {
    let regions = ctx
        .client
        .list_regions(&ctx.host, ctx.port)
        .await
        .with_context(|| format!("Failed to list regions on {}:{}", ctx.host, ctx.port))?;

    println!("{}", regions.join(" "));
    Ok(())
}
