use anyhow::Result;
use corral_telemetry::{TailState, tail};
use corral_types::TailEvent;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;

use crate::context::Context;
use crate::views;

fn print_event(ctx: &Context, event: &TailEvent) -> Result<()> {
    if ctx.is_json() {
        ctx.print_json_line(event)
    } else {
        println!("{}", views::event_line(event, ctx.color));
        Ok(())
    }
}

pub async fn handle(
    ctx: &Context,
    path: PathBuf,
    once: bool,
    interval_ms: Option<u64>,
) -> Result<()> {
    if once {
        let mut state = TailState::from_start(path);
        loop {
            let before = state.offset();
            for event in state.poll().await {
                print_event(ctx, &event)?;
            }
            // Stop at end of file, or when a read failed and nothing moved.
            if state.offset() >= state.last_size() || state.offset() == before {
                break;
            }
        }
        for event in state.finish() {
            print_event(ctx, &event)?;
        }
        return Ok(());
    }

    let interval = interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| ctx.config.tail_interval());
    let events = tail(path, interval);
    futures::pin_mut!(events);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(()),
            next = events.next() => match next {
                Some(event) => print_event(ctx, &event)?,
                None => return Ok(()),
            },
        }
    }
}
