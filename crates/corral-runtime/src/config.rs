use crate::{Error, Result};
use corral_panes::DiscoveryConfig;
use corral_panes::naming::{DEFAULT_SCOPE, default_log_dir};
use corral_telemetry::SnapshotOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolve the data directory based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. CORRAL_PATH environment variable (with tilde expansion)
/// 3. XDG data directory
/// 4. ~/.corral
pub fn resolve_data_dir(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("CORRAL_PATH")
        && !env_path.is_empty()
    {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("corral"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".corral"));
    }

    Err(Error::Config(
        "Could not determine data directory: no HOME directory or XDG data directory found"
            .to_string(),
    ))
}

/// Expand a leading `~/` to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

fn default_commands() -> BTreeMap<String, String> {
    ["claude", "gemini", "codex"]
        .into_iter()
        .map(|agent| (agent.to_string(), agent.to_string()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `{type}_{scope}_{token}.log` files
    pub log_dir: PathBuf,
    pub scope: String,
    pub discovery_interval_ms: u64,
    pub tail_interval_ms: u64,
    /// Pause after `respawn-pane` before the pane is reused
    pub restart_settle_ms: u64,
    /// Root of Claude session transcripts
    pub projects_dir: String,
    pub snapshot: SnapshotOptions,
    /// Agent type to launch command
    pub commands: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            scope: DEFAULT_SCOPE.to_string(),
            discovery_interval_ms: 2500,
            tail_interval_ms: 400,
            restart_settle_ms: 500,
            projects_dir: "~/.claude/projects".to_string(),
            snapshot: SnapshotOptions::default(),
            commands: default_commands(),
        }
    }
}

impl Config {
    /// Load `config.toml` from `data_dir`.
    pub fn load(data_dir: &Path) -> Result<Self> {
        Self::load_from(&Self::path_in(data_dir))
    }

    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join("config.toml")
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::path_in(&resolve_data_dir(None)?))
    }

    pub fn discovery_interval(&self) -> Duration {
        Duration::from_millis(self.discovery_interval_ms.max(1))
    }

    pub fn tail_interval(&self) -> Duration {
        Duration::from_millis(self.tail_interval_ms.max(1))
    }

    pub fn restart_settle(&self) -> Duration {
        Duration::from_millis(self.restart_settle_ms)
    }

    pub fn projects_path(&self) -> PathBuf {
        expand_tilde(&self.projects_dir)
    }

    pub fn discovery(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            log_dir: self.log_dir.clone(),
            scope: self.scope.clone(),
            collect_stale: true,
        }
    }

    /// Launch command for `agent_type`; unknown types run as their own name.
    pub fn command_for(&self, agent_type: &str) -> String {
        self.commands
            .get(agent_type)
            .cloned()
            .unwrap_or_else(|| agent_type.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.scope, "corral");
        assert_eq!(config.discovery_interval(), Duration::from_millis(2500));
        assert_eq!(config.tail_interval(), Duration::from_millis(400));
        assert_eq!(config.snapshot.max_lines, 200);
        assert_eq!(config.command_for("claude"), "claude");
    }

    #[test]
    fn test_config_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = Config::path_in(temp_dir.path());

        let mut config = Config {
            log_dir: PathBuf::from("/var/log/agents"),
            tail_interval_ms: 250,
            ..Config::default()
        };
        config
            .commands
            .insert("claude".to_string(), "claude --model opus".to_string());

        config.save_to(&config_path)?;
        assert!(config_path.exists());

        let loaded = Config::load(temp_dir.path())?;
        assert_eq!(loaded, config);
        assert_eq!(loaded.command_for("claude"), "claude --model opus");
        Ok(())
    }

    #[test]
    fn test_partial_file_fills_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "scope = \"team\"\n\n[snapshot]\nmax_lines = 50\n",
        )?;

        let config = Config::load_from(&config_path)?;
        assert_eq!(config.scope, "team");
        assert_eq!(config.snapshot.max_lines, 50);
        assert_eq!(config.snapshot.chunk_size, 4096);
        assert_eq!(config.discovery_interval_ms, 2500);
        assert_eq!(config.discovery().scope, "team");
        Ok(())
    }

    #[test]
    fn test_invalid_file_is_config_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "tail_interval_ms = \"soon\"\n")?;

        assert!(matches!(
            Config::load_from(&config_path),
            Err(Error::Config(_))
        ));
        Ok(())
    }

    #[test]
    fn test_load_nonexistent_returns_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = Config::load(temp_dir.path())?;
        assert_eq!(config, Config::default());
        Ok(())
    }

    #[test]
    fn test_explicit_data_dir_wins() -> Result<()> {
        assert_eq!(
            resolve_data_dir(Some("/opt/corral"))?,
            PathBuf::from("/opt/corral")
        );
        Ok(())
    }

    #[test]
    fn test_expand_tilde() {
        if let Some(home) = std::env::var_os("HOME") {
            assert_eq!(
                expand_tilde("~/.claude/projects"),
                PathBuf::from(home).join(".claude/projects")
            );
        }
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
    }
}
