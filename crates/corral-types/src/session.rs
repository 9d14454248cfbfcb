use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A live tmux pane as reported by `list-panes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneRecord {
    pub title: String,
    pub session_name: String,
    /// `session:window.pane`
    pub target: String,
    pub working_directory: PathBuf,
}

impl PaneRecord {
    /// Basename of the pane's working directory, or empty if it has none.
    pub fn folder_name(&self) -> &str {
        self.working_directory
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
    }

    /// The same pane after its session was renamed. The target address
    /// embeds the session name, so it is rewritten too.
    pub fn renamed(&self, new_session: &str) -> Self {
        let target = match self.target.split_once(':') {
            Some((_, window_pane)) => format!("{}:{}", new_session, window_pane),
            None => new_session.to_string(),
        };
        Self {
            title: self.title.clone(),
            session_name: new_session.to_string(),
            target,
            working_directory: self.working_directory.clone(),
        }
    }
}

/// Logical agent identity. Stable across polls; replaced on restart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentIdentity {
    pub name: String,
    pub agent_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
}

impl AgentIdentity {
    pub fn new(name: impl Into<String>, agent_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            agent_type: agent_type.into(),
            session_id: None,
        }
    }

    pub fn with_session_id(mut self, session_id: Uuid) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Registry key: the session id when one is known, else `type:name`.
    pub fn key(&self) -> String {
        match self.session_id {
            Some(id) => id.to_string(),
            None => format!("{}:{}", self.agent_type, self.name),
        }
    }
}

/// Current binding of an identity to one pane and one log file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEpoch {
    pub identity: AgentIdentity,
    pub pane: PaneRecord,
    pub log_path: PathBuf,
}

impl SessionEpoch {
    pub fn key(&self) -> String {
        self.identity.key()
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}
