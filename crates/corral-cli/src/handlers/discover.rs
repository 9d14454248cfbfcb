use anyhow::Result;
use corral_panes::discover_agents;

use crate::context::Context;
use crate::views;

pub async fn handle(ctx: &Context) -> Result<()> {
    let agents = discover_agents(&ctx.tmux(), &ctx.config.discovery()).await;

    if ctx.is_json() {
        return ctx.print_json(&agents);
    }
    if agents.is_empty() {
        println!("No agents found in {}", ctx.config.log_dir.display());
        return Ok(());
    }
    for agent in &agents {
        println!("{}", views::epoch_line(agent, ctx.color));
    }
    Ok(())
}
