//! Naming conventions that encode identity in file and session names.
//!
//! Log files: `{type}_{scope}_{token}.log`, where the token is either a
//! legacy agent name or a session UUID. Sessions: `{type}-{uuid}`.

use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const DEFAULT_SCOPE: &str = "corral";

/// `$TMPDIR`, falling back to `/tmp`.
pub fn default_log_dir() -> PathBuf {
    std::env::var_os("TMPDIR")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
}

pub fn log_file_name(agent_type: &str, scope: &str, token: &str) -> String {
    format!("{}_{}_{}.log", agent_type, scope, token)
}

pub fn log_path(log_dir: &Path, agent_type: &str, scope: &str, token: &str) -> PathBuf {
    log_dir.join(log_file_name(agent_type, scope, token))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogName {
    pub agent_type: String,
    pub token: String,
}

impl LogName {
    /// The token as a session id, when it is one.
    pub fn session_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.token).ok()
    }
}

/// Parse `{type}_{scope}_{token}.log`. The type may not contain `_`.
pub fn parse_log_file_name(file_name: &str, scope: &str) -> Option<LogName> {
    let stem = file_name.strip_suffix(".log")?;
    let (agent_type, rest) = stem.split_once('_')?;
    let token = rest.strip_prefix(scope)?.strip_prefix('_')?;
    if agent_type.is_empty() || token.is_empty() {
        return None;
    }
    Some(LogName {
        agent_type: agent_type.to_string(),
        token: token.to_string(),
    })
}

pub fn session_name(agent_type: &str, session_id: Uuid) -> String {
    format!("{}-{}", agent_type, session_id)
}

/// Parse `{type}-{uuid}`.
pub fn parse_session_name(name: &str) -> Option<(String, Uuid)> {
    const UUID_LEN: usize = 36;
    let split = name.len().checked_sub(UUID_LEN + 1)?;
    if !name.is_char_boundary(split) {
        return None;
    }
    let (agent_type, rest) = name.split_at(split);
    let id = Uuid::parse_str(rest.strip_prefix('-')?).ok()?;
    if agent_type.is_empty() {
        return None;
    }
    Some((agent_type.to_string(), id))
}

/// Single-quote `text` for `sh -c`.
pub(crate) fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "abc123de-0000-4000-8000-00000000beef";

    #[test]
    fn test_parse_log_file_name() {
        assert_eq!(
            parse_log_file_name("claude_corral_my-agent.log", "corral"),
            Some(LogName {
                agent_type: "claude".to_string(),
                token: "my-agent".to_string()
            })
        );

        let name = parse_log_file_name(&format!("gemini_corral_{}.log", ID), "corral").unwrap();
        assert_eq!(name.agent_type, "gemini");
        assert_eq!(name.session_id(), Uuid::parse_str(ID).ok());
    }

    #[test]
    fn test_parse_log_file_name_rejects_other_files() {
        assert_eq!(parse_log_file_name("claude_corral_.log", "corral"), None);
        assert_eq!(parse_log_file_name("claude_other_api.log", "corral"), None);
        assert_eq!(parse_log_file_name("claude_corral_api.txt", "corral"), None);
        assert_eq!(parse_log_file_name("notes.log", "corral"), None);
    }

    #[test]
    fn test_token_may_contain_underscores() {
        let name = parse_log_file_name("claude_corral_my_agent.log", "corral").unwrap();
        assert_eq!(name.token, "my_agent");
        assert_eq!(name.session_id(), None);
    }

    #[test]
    fn test_session_name_round_trip() {
        let id = Uuid::parse_str(ID).unwrap();
        let name = session_name("claude", id);
        assert_eq!(name, format!("claude-{}", ID));
        assert_eq!(parse_session_name(&name), Some(("claude".to_string(), id)));
    }

    #[test]
    fn test_parse_session_name_rejects_plain_names() {
        assert_eq!(parse_session_name("main"), None);
        assert_eq!(parse_session_name(&format!("-{}", ID)), None);
        assert_eq!(parse_session_name("claude-not-a-uuid-at-all-but-long-enough"), None);
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("/tmp/a b.log"), "'/tmp/a b.log'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }
}
