use anyhow::{Result, anyhow};
use corral_panes::{LaunchRequest, RestartRequest, discover_agents, kill, launch, restart};
use corral_types::SessionEpoch;
use std::path::PathBuf;

use crate::context::Context;
use crate::views;

async fn find_agent(ctx: &Context, key: &str) -> Result<SessionEpoch> {
    discover_agents(&ctx.tmux(), &ctx.config.discovery())
        .await
        .into_iter()
        .find(|agent| agent.key() == key)
        .ok_or_else(|| anyhow!("no running agent with key {}", key))
}

fn print_epoch(ctx: &Context, epoch: &SessionEpoch) -> Result<()> {
    if ctx.is_json() {
        return ctx.print_json(epoch);
    }
    println!("{}", views::epoch_line(epoch, ctx.color));
    Ok(())
}

pub async fn handle_launch(ctx: &Context, dir: PathBuf, agent_type: String) -> Result<()> {
    let working_directory = std::path::absolute(&dir)?;
    let request = LaunchRequest {
        working_directory,
        command: ctx.config.command_for(&agent_type),
        agent_type,
        log_dir: ctx.config.log_dir.clone(),
        scope: ctx.config.scope.clone(),
    };
    let epoch = launch(&ctx.tmux(), &request).await?;
    print_epoch(ctx, &epoch)
}

pub async fn handle_restart(ctx: &Context, key: String, resume: Option<String>) -> Result<()> {
    let old = find_agent(ctx, &key).await?;
    let request = RestartRequest {
        command: ctx.config.command_for(&old.identity.agent_type),
        resume_id: resume,
        scope: ctx.config.scope.clone(),
        settle: ctx.config.restart_settle(),
    };
    let epoch = restart(&ctx.tmux(), &old, &request).await?;
    print_epoch(ctx, &epoch)
}

pub async fn handle_kill(ctx: &Context, key: String) -> Result<()> {
    let epoch = find_agent(ctx, &key).await?;
    kill(&ctx.tmux(), &epoch).await?;
    if !ctx.is_json() {
        println!("Killed {}", epoch.identity.name);
    }
    Ok(())
}
