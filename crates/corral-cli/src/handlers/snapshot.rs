use anyhow::Result;
use corral_telemetry::snapshot;
use std::path::PathBuf;

use crate::context::Context;
use crate::views;

pub async fn handle(ctx: &Context, path: PathBuf, lines: Option<usize>) -> Result<()> {
    let mut options = ctx.config.snapshot.clone();
    if let Some(lines) = lines {
        options.max_lines = lines;
    }

    let snapshot = snapshot(path, &options).await;

    if ctx.is_json() {
        return ctx.print_json(&snapshot);
    }
    println!("{}", views::snapshot_text(&snapshot, ctx.color));
    Ok(())
}
