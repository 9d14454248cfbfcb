use anyhow::{Result, bail};
use corral_panes::{PaneQuery, list_panes, resolve_pane_tier};
use serde_json::json;

use crate::context::Context;
use crate::views;

pub async fn handle(
    ctx: &Context,
    name: String,
    agent_type: Option<String>,
    session_id: Option<String>,
) -> Result<()> {
    let mut query = PaneQuery::named(name);
    if let Some(agent_type) = agent_type {
        query = query.with_type(agent_type);
    }
    if let Some(session_id) = session_id {
        query = query.with_session_id(session_id);
    }

    let panes = list_panes(&ctx.tmux()).await?;
    let Some((tier, pane)) = resolve_pane_tier(&panes, &query) else {
        bail!("no pane matches '{}'", query.name);
    };

    if ctx.is_json() {
        return ctx.print_json(&json!({
            "tier": format!("{:?}", tier),
            "pane": pane,
        }));
    }
    println!("{}", views::pane_line(pane, tier, ctx.color));
    Ok(())
}
