use corral_types::{AgentIdentity, PaneRecord, SessionEpoch};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::Result;
use crate::mux::{Multiplexer, list_panes};
use crate::naming::{self, LogName, parse_log_file_name, parse_session_name};
use crate::resolver::{PaneQuery, resolve_pane};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    pub log_dir: PathBuf,
    pub scope: String,
    /// Delete log files whose agent no longer has a live pane
    pub collect_stale: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            log_dir: naming::default_log_dir(),
            scope: naming::DEFAULT_SCOPE.to_string(),
            collect_stale: true,
        }
    }
}

fn scan_log_files(log_dir: &Path, scope: &str) -> Vec<(PathBuf, LogName)> {
    let mut found: Vec<(PathBuf, LogName)> = WalkDir::new(log_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let name = parse_log_file_name(entry.file_name().to_str()?, scope)?;
            Some((entry.into_path(), name))
        })
        .collect();
    found.sort_by(|a, b| a.0.cmp(&b.0));
    found
}

fn identity_for_log(name: &LogName, pane: &PaneRecord) -> AgentIdentity {
    match name.session_id() {
        Some(id) => {
            let display = match pane.folder_name() {
                "" => name.token.as_str(),
                folder => folder,
            };
            AgentIdentity::new(display, &name.agent_type).with_session_id(id)
        }
        None => AgentIdentity::new(&name.token, &name.agent_type),
    }
}

fn query_for_log(name: &LogName) -> PaneQuery {
    let query = PaneQuery::named(&name.token).with_type(&name.agent_type);
    match name.session_id() {
        Some(id) => query.with_session_id(id.to_string()),
        None => query,
    }
}

/// Find every agent that currently has a live pane.
///
/// Candidates come from log files named `{type}_{scope}_{token}.log` and
/// from panes whose session is named `{type}-{uuid}`. A log file whose
/// agent has no pane is stale and, with `collect_stale`, deleted. Each pane
/// hosts at most one agent; a name-based log never claims a `{type}-{uuid}`
/// session, so it goes stale once its agent is restarted. When the
/// pane listing itself fails nothing is returned and nothing is deleted.
pub async fn discover_agents(mux: &dyn Multiplexer, config: &DiscoveryConfig) -> Vec<SessionEpoch> {
    match try_discover_agents(mux, config).await {
        Ok(agents) => agents,
        Err(err) => {
            tracing::warn!(error = %err, "listing panes failed, skipping discovery");
            Vec::new()
        }
    }
}

/// Like [`discover_agents`], but a failed pane listing is returned as an
/// error so callers can tell "no agents" from "could not look".
pub async fn try_discover_agents(
    mux: &dyn Multiplexer,
    config: &DiscoveryConfig,
) -> Result<Vec<SessionEpoch>> {
    let panes = list_panes(mux).await?;

    let log_dir = config.log_dir.clone();
    let scope = config.scope.clone();
    let logs = match tokio::task::spawn_blocking(move || scan_log_files(&log_dir, &scope)).await {
        Ok(logs) => logs,
        Err(err) => {
            tracing::warn!(error = %err, "scanning log directory failed");
            Vec::new()
        }
    };

    // A `{type}-{uuid}` session belongs to its uuid log, never to a
    // name-based one.
    let unmanaged: Vec<PaneRecord> = panes
        .iter()
        .filter(|pane| parse_session_name(&pane.session_name).is_none())
        .cloned()
        .collect();

    let mut agents = Vec::new();
    let mut seen = HashSet::new();
    let mut claimed = HashSet::new();

    for (path, name) in logs {
        let candidates = match name.session_id() {
            Some(_) => &panes,
            None => &unmanaged,
        };
        match resolve_pane(candidates, &query_for_log(&name)) {
            Some(pane) => {
                if !claimed.insert(pane.target.clone()) {
                    tracing::debug!(path = %path.display(), target = %pane.target, "pane already claimed");
                    continue;
                }
                let identity = identity_for_log(&name, pane);
                if seen.insert(identity.key()) {
                    agents.push(SessionEpoch {
                        identity,
                        pane: pane.clone(),
                        log_path: path,
                    });
                }
            }
            None if config.collect_stale => {
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => tracing::info!(path = %path.display(), "removed stale agent log"),
                    Err(err) => {
                        tracing::debug!(path = %path.display(), error = %err, "stale log not removed")
                    }
                }
            }
            None => {}
        }
    }

    for pane in &panes {
        if claimed.contains(&pane.target) {
            continue;
        }
        let Some((agent_type, id)) = parse_session_name(&pane.session_name) else {
            continue;
        };
        let name = match pane.folder_name() {
            "" => pane.session_name.as_str(),
            folder => folder,
        };
        let identity = AgentIdentity::new(name, &agent_type).with_session_id(id);
        if seen.insert(identity.key()) {
            agents.push(SessionEpoch {
                log_path: naming::log_path(
                    &config.log_dir,
                    &agent_type,
                    &config.scope,
                    &id.to_string(),
                ),
                identity,
                pane: pane.clone(),
            });
        }
    }

    agents.sort_by(|a, b| {
        a.identity
            .name
            .cmp(&b.identity.name)
            .then_with(|| a.key().cmp(&b.key()))
    });
    Ok(agents)
}
