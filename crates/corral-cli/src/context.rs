use anyhow::Result;
use corral_panes::Tmux;
use corral_runtime::{Config, resolve_data_dir};
use is_terminal::IsTerminal;
use serde::Serialize;

use crate::args::Cli;
use crate::types::OutputFormat;

/// Settings shared by every command.
pub struct Context {
    pub config: Config,
    pub format: OutputFormat,
    pub color: bool,
    tmux_socket: Option<String>,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let data_dir = resolve_data_dir(cli.data_dir.as_deref())?;
        let mut config = Config::load(&data_dir)?;
        if let Some(log_dir) = &cli.log_dir {
            config.log_dir = log_dir.clone();
        }
        tracing::debug!(data_dir = %data_dir.display(), log_dir = %config.log_dir.display(), "loaded config");

        Ok(Self {
            config,
            format: cli.format,
            color: cli.format == OutputFormat::Plain && std::io::stdout().is_terminal(),
            tmux_socket: cli.tmux_socket.clone(),
        })
    }

    pub fn tmux(&self) -> Tmux {
        match &self.tmux_socket {
            Some(name) => Tmux::new().with_socket_name(name),
            None => Tmux::new(),
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Pretty JSON for one-shot results.
    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// One compact JSON object per line for streams.
    pub fn print_json_line<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string(value)?);
        Ok(())
    }
}
