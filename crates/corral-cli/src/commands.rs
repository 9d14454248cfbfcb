use anyhow::Result;

use crate::args::{Cli, Commands};
use crate::context::Context;
use crate::handlers;
use crate::logging;

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level);
    let ctx = Context::from_cli(&cli)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        match cli.command {
            Commands::Discover => handlers::discover::handle(&ctx).await,
            Commands::Resolve {
                name,
                agent_type,
                session_id,
            } => handlers::resolve::handle(&ctx, name, agent_type, session_id).await,
            Commands::Snapshot { path, lines } => {
                handlers::snapshot::handle(&ctx, path, lines).await
            }
            Commands::Tail {
                path,
                once,
                interval_ms,
            } => handlers::tail::handle(&ctx, path, once, interval_ms).await,
            Commands::Watch => handlers::watch::handle(&ctx).await,
            Commands::Transcript { session, follow } => {
                handlers::transcript::handle(&ctx, session, follow).await
            }
            Commands::Launch { dir, agent_type } => {
                handlers::lifecycle::handle_launch(&ctx, dir, agent_type).await
            }
            Commands::Restart { key, resume } => {
                handlers::lifecycle::handle_restart(&ctx, key, resume).await
            }
            Commands::Kill { key } => handlers::lifecycle::handle_kill(&ctx, key).await,
        }
    })
}
