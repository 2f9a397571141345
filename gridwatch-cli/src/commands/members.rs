//! Member Count Command

use super::Context;
use anyhow::{Context as _, Result};

/// Print the number of data-holding members (locators excluded)
pub async fn run(ctx: &Context) -> Result<()> {
    let members = ctx
        .client
        .member_count(&ctx.host, ctx.port)
        .await
        .with_context(|| format!("Failed to read member count from {}:{}", ctx.host, ctx.port))?;

    println!("{}", members);
    Ok(())
}
