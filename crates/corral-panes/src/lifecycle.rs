//! Launching, restarting and stopping agent sessions.
//!
//! Each operation changes tmux state, so unlike discovery these return
//! errors to the caller instead of logging and carrying on.

use corral_types::{AgentIdentity, PaneRecord, SessionEpoch};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

use crate::mux::{Multiplexer, exec};
use crate::naming::{self, shell_quote};
use crate::{Error, Result};

const TARGET_FORMAT: &str = "#{session_name}:#{window_index}.#{pane_index}";

#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub working_directory: PathBuf,
    pub agent_type: String,
    /// Shell command that starts the agent
    pub command: String,
    pub log_dir: PathBuf,
    pub scope: String,
}

#[derive(Debug, Clone)]
pub struct RestartRequest {
    pub command: String,
    /// Conversation to resume, appended as `--resume <id>`
    pub resume_id: Option<String>,
    pub scope: String,
    /// Pause between respawning the pane and clearing its history
    pub settle: Duration,
}

impl RestartRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            resume_id: None,
            scope: naming::DEFAULT_SCOPE.to_string(),
            settle: Duration::from_millis(500),
        }
    }

    pub fn resume(mut self, id: impl Into<String>) -> Self {
        self.resume_id = Some(id.into());
        self
    }

    /// Only Claude can resume a conversation.
    pub fn check(&self, agent_type: &str) -> Result<()> {
        if self.resume_id.is_some() && !agent_type.eq_ignore_ascii_case("claude") {
            return Err(Error::Unsupported(format!(
                "resume is only available for claude agents, not {}",
                agent_type
            )));
        }
        Ok(())
    }

    fn command_line(&self) -> String {
        match &self.resume_id {
            Some(id) => format!("{} --resume {}", self.command, id),
            None => self.command.clone(),
        }
    }
}

/// Type literal text into a pane and press Enter.
pub async fn send_text(mux: &dyn Multiplexer, target: &str, text: &str) -> Result<()> {
    exec(mux, &["send-keys", "-t", target, "-l", text]).await?;
    send_keys(mux, target, &["Enter"]).await
}

/// Press tmux key names (`Escape`, `C-c`, `BTab`, ...) one at a time.
pub async fn send_keys(mux: &dyn Multiplexer, target: &str, keys: &[&str]) -> Result<()> {
    for key in keys {
        exec(mux, &["send-keys", "-t", target, key]).await?;
    }
    Ok(())
}

fn pane_title(pane: &PaneRecord, agent_type: &str) -> String {
    format!("{} — {}", pane.folder_name(), agent_type)
}

/// The last `lines` lines of a pane's scrollback.
pub async fn capture_pane(mux: &dyn Multiplexer, target: &str, lines: usize) -> Result<String> {
    let start = format!("-{}", lines);
    exec(mux, &["capture-pane", "-p", "-t", target, "-S", &start]).await
}

async fn pipe_to(mux: &dyn Multiplexer, target: &str, log_path: &Path) -> Result<()> {
    let sink = format!("cat >> {}", shell_quote(&log_path.to_string_lossy()));
    exec(mux, &["pipe-pane", "-t", target, "-o", &sink]).await?;
    Ok(())
}

async fn remove_log(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Start a new agent in its own detached session.
pub async fn launch(mux: &dyn Multiplexer, request: &LaunchRequest) -> Result<SessionEpoch> {
    let id = Uuid::new_v4();
    let session = naming::session_name(&request.agent_type, id);
    let log_path = naming::log_path(
        &request.log_dir,
        &request.agent_type,
        &request.scope,
        &id.to_string(),
    );
    tokio::fs::File::create(&log_path).await?;

    let dir = request.working_directory.to_string_lossy();
    let created = exec(
        mux,
        &["new-session", "-d", "-s", &session, "-c", &dir, "-P", "-F", TARGET_FORMAT],
    )
    .await;
    let target = match created {
        Ok(stdout) => match stdout.trim() {
            "" => {
                remove_log(&log_path).await?;
                return Err(Error::UnexpectedOutput(format!(
                    "new-session printed no target for {}",
                    session
                )));
            }
            target => target.to_string(),
        },
        Err(err) => {
            remove_log(&log_path).await?;
            return Err(err);
        }
    };

    let pane = PaneRecord {
        title: String::new(),
        session_name: session,
        target,
        working_directory: request.working_directory.clone(),
    };
    let title = pane_title(&pane, &request.agent_type);

    pipe_to(mux, &pane.target, &log_path).await?;
    exec(mux, &["select-pane", "-t", &pane.target, "-T", &title]).await?;
    send_text(mux, &pane.target, &request.command).await?;

    let identity = AgentIdentity::new(pane.folder_name(), &request.agent_type).with_session_id(id);
    tracing::info!(key = %identity.key(), target = %pane.target, "launched agent");

    Ok(SessionEpoch {
        identity,
        pane: PaneRecord { title, ..pane },
        log_path,
    })
}

/// Restart the agent in place under a fresh session id.
///
/// The pane survives, but its session is renamed, its output goes to a new
/// log file and the old log file is removed. The returned epoch replaces
/// `epoch`; anything keyed by the old identity is stale.
pub async fn restart(
    mux: &dyn Multiplexer,
    epoch: &SessionEpoch,
    request: &RestartRequest,
) -> Result<SessionEpoch> {
    let agent_type = &epoch.identity.agent_type;
    request.check(agent_type)?;

    let id = Uuid::new_v4();
    let old = &epoch.pane;
    let dir = old.working_directory.to_string_lossy();

    // Closes the existing pipe.
    exec(mux, &["pipe-pane", "-t", &old.target]).await?;
    exec(mux, &["respawn-pane", "-k", "-t", &old.target, "-c", &dir]).await?;
    tokio::time::sleep(request.settle).await;
    exec(mux, &["clear-history", "-t", &old.target]).await?;

    let session = naming::session_name(agent_type, id);
    exec(mux, &["rename-session", "-t", &old.session_name, &session]).await?;
    let renamed = old.renamed(&session);
    let title = pane_title(&renamed, agent_type);
    exec(mux, &["select-pane", "-t", &renamed.target, "-T", &title]).await?;
    let pane = PaneRecord { title, ..renamed };

    let log_dir = epoch
        .log_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(naming::default_log_dir);
    let log_path = naming::log_path(&log_dir, agent_type, &request.scope, &id.to_string());
    tokio::fs::File::create(&log_path).await?;

    pipe_to(mux, &pane.target, &log_path).await?;
    send_text(mux, &pane.target, &request.command_line()).await?;

    if epoch.log_path != log_path {
        remove_log(&epoch.log_path).await?;
    }

    let identity = AgentIdentity::new(&epoch.identity.name, agent_type).with_session_id(id);
    tracing::info!(
        old = %epoch.key(),
        new = %identity.key(),
        target = %pane.target,
        "restarted agent"
    );

    Ok(SessionEpoch {
        identity,
        pane,
        log_path,
    })
}

/// Kill the agent's session and remove its log file.
pub async fn kill(mux: &dyn Multiplexer, epoch: &SessionEpoch) -> Result<()> {
    exec(mux, &["kill-session", "-t", &epoch.pane.session_name]).await?;
    remove_log(&epoch.log_path).await?;
    tracing::info!(key = %epoch.key(), "killed agent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_with_resume() {
        let request = RestartRequest::new("claude");
        assert_eq!(request.command_line(), "claude");
        assert_eq!(
            request.resume("abc").command_line(),
            "claude --resume abc"
        );
    }

    #[test]
    fn test_resume_is_claude_only() {
        let request = RestartRequest::new("gemini").resume("abc");
        assert!(matches!(
            request.check("gemini"),
            Err(Error::Unsupported(_))
        ));
        assert!(request.check("Claude").is_ok());
        assert!(RestartRequest::new("gemini").check("gemini").is_ok());
    }

    #[tokio::test]
    async fn test_remove_missing_log_is_ok() {
        let dir = tempfile::TempDir::new().unwrap();
        remove_log(&dir.path().join("gone.log")).await.unwrap();
    }
}
