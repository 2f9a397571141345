//! Raw Command
//!
//! Passes an object path and mode straight through to the bridge and
//! prints the returned `value` as JSON.

use super::Context;
use anyhow::{Context as _, Result};
use gridwatch_core::Mode;

pub async fn run(ctx: &Context, mode: Mode, object_path: &str) -> Result<()> {
    let value = ctx
        .client
        .raw(&ctx.host, ctx.port, mode, object_path)
        .await
        .with_context(|| format!("Raw {} query for {} failed", mode, object_path))?;

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
