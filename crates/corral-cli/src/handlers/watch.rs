use anyhow::Result;
use corral_runtime::AgentRegistry;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use crate::context::Context;
use crate::views;

pub async fn handle(ctx: &Context) -> Result<()> {
    let registry = AgentRegistry::new(Arc::new(ctx.tmux()), ctx.config.clone());

    let (event_tx, mut event_rx) = mpsc::channel(256);
    // Commands are not read from the terminal; the sender only keeps the
    // channel open for the lifetime of the loop.
    let (_command_tx, command_rx) = mpsc::channel(1);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(registry.run(event_tx, command_rx, shutdown_rx));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            next = event_rx.recv() => match next {
                Some(event) => {
                    if ctx.is_json() {
                        ctx.print_json_line(&event)?;
                    } else {
                        println!("{}", views::registry_line(&event, ctx.color));
                    }
                }
                None => break,
            },
        }
    }

    let _ = shutdown_tx.send(true);
    drop(event_rx);
    task.await?;
    Ok(())
}
