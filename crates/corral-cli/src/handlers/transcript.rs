use anyhow::{Context as _, Result};
use corral_telemetry::{TranscriptReader, find_transcript};
use std::path::PathBuf;

use crate::context::Context;
use crate::views;

fn locate(ctx: &Context, session: &str) -> Result<PathBuf> {
    let path = PathBuf::from(session);
    if path.is_file() {
        return Ok(path);
    }
    let projects = ctx.config.projects_path();
    find_transcript(&projects, session, None).with_context(|| {
        format!(
            "no transcript for session {} under {}",
            session,
            projects.display()
        )
    })
}

fn drain(ctx: &Context, reader: &mut TranscriptReader) -> Result<()> {
    let events = reader
        .read_new()
        .with_context(|| format!("reading {}", reader.path().display()))?;
    for event in &events {
        if ctx.is_json() {
            ctx.print_json_line(event)?;
        } else {
            println!("{}", views::event_line(event, ctx.color));
        }
    }
    Ok(())
}

pub async fn handle(ctx: &Context, session: String, follow: bool) -> Result<()> {
    let mut reader = TranscriptReader::new(locate(ctx, &session)?);
    drain(ctx, &mut reader)?;
    if !follow {
        return Ok(());
    }

    let mut clock = tokio::time::interval(ctx.config.tail_interval());
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(()),
            _ = clock.tick() => {
                if let Err(err) = drain(ctx, &mut reader) {
                    tracing::debug!(error = %err, "transcript poll failed");
                }
            }
        }
    }
}
