use corral_types::PaneRecord;
use futures::future::BoxFuture;
use std::path::PathBuf;
use std::time::Duration;

use crate::{Error, Result};

/// Field separator in `list-panes` output. Titles and paths may contain
/// `|`; tabs are rare in both.
const FIELD_SEPARATOR: char = '\t';

/// `list-panes -F` format: title, session name, target, working directory.
pub const PANE_FORMAT: &str =
    "#{pane_title}\t#{session_name}\t#{session_name}:#{window_index}.#{pane_index}\t#{pane_current_path}";

const COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs tmux subcommands. `args` excludes the program name.
pub trait Multiplexer: Send + Sync {
    fn run<'a>(&'a self, args: &'a [String]) -> BoxFuture<'a, std::io::Result<CommandOutput>>;
}

/// The real tmux binary, optionally on a dedicated server socket.
#[derive(Debug, Clone)]
pub struct Tmux {
    program: PathBuf,
    socket_name: Option<String>,
}

impl Default for Tmux {
    fn default() -> Self {
        Self {
            program: PathBuf::from("tmux"),
            socket_name: None,
        }
    }
}

impl Tmux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Talk to the server on `-L <name>` instead of the default socket.
    pub fn with_socket_name(mut self, name: impl Into<String>) -> Self {
        self.socket_name = Some(name.into());
        self
    }
}

impl Multiplexer for Tmux {
    fn run<'a>(&'a self, args: &'a [String]) -> BoxFuture<'a, std::io::Result<CommandOutput>> {
        Box::pin(async move {
            let mut command = tokio::process::Command::new(&self.program);
            if let Some(socket) = &self.socket_name {
                command.arg("-L").arg(socket);
            }
            command.args(args).kill_on_drop(true);

            let output = tokio::time::timeout(COMMAND_TIMEOUT, command.output())
                .await
                .map_err(|_| {
                    std::io::Error::new(std::io::ErrorKind::TimedOut, "tmux did not respond")
                })??;

            Ok(CommandOutput {
                success: output.status.success(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        })
    }
}

/// Run a tmux subcommand, turning a non-zero exit into an error.
pub async fn exec(mux: &dyn Multiplexer, args: &[&str]) -> Result<String> {
    let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
    let output = mux.run(&args).await?;
    if !output.success {
        return Err(Error::Command {
            args,
            stderr: output.stderr.trim().to_string(),
        });
    }
    Ok(output.stdout)
}

/// All live panes across all sessions.
pub async fn list_panes(mux: &dyn Multiplexer) -> Result<Vec<PaneRecord>> {
    let stdout = exec(mux, &["list-panes", "-a", "-F", PANE_FORMAT]).await?;
    Ok(parse_pane_list(&stdout))
}

/// Parse `list-panes` output in [`PANE_FORMAT`]. Lines with missing fields
/// are skipped.
pub fn parse_pane_list(stdout: &str) -> Vec<PaneRecord> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut fields = line.splitn(4, FIELD_SEPARATOR);
            let title = fields.next()?;
            let session_name = fields.next()?;
            let target = fields.next()?;
            let working_directory = fields.next()?;
            Some(PaneRecord {
                title: title.to_string(),
                session_name: session_name.to_string(),
                target: target.to_string(),
                working_directory: PathBuf::from(working_directory),
            })
        })
        .collect()
}
