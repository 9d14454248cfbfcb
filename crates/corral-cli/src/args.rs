use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::{LogLevel, OutputFormat};

#[derive(Parser)]
#[command(name = "corral")]
#[command(about = "Watch coding agents running in tmux panes", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data directory holding config.toml (default: $CORRAL_PATH, then the XDG data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Directory of agent log files, overriding the config
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// tmux server socket name (`tmux -L`)
    #[arg(long, global = true)]
    pub tmux_socket: Option<String>,

    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    #[arg(long, default_value = "info", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List agents that have a live pane
    Discover,

    /// Find the pane hosting an agent
    Resolve {
        name: String,

        #[arg(long)]
        agent_type: Option<String>,

        #[arg(long)]
        session_id: Option<String>,
    },

    /// Current status, summary and recent lines of a log file
    Snapshot {
        path: PathBuf,

        /// Number of recent lines to keep
        #[arg(long)]
        lines: Option<usize>,
    },

    /// Stream events appended to a log file
    Tail {
        path: PathBuf,

        /// Read the file from its first byte once and exit
        #[arg(long)]
        once: bool,

        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Run discovery and tailing for every agent until interrupted
    Watch,

    /// Conversation events from a Claude transcript
    Transcript {
        /// Session id or path to a .jsonl transcript
        session: String,

        /// Keep polling for new records
        #[arg(long)]
        follow: bool,
    },

    /// Start an agent in a new tmux session
    Launch {
        /// Working directory for the agent
        dir: PathBuf,

        #[arg(long, default_value = "claude")]
        agent_type: String,
    },

    /// Restart an agent in place under a new session id
    Restart {
        /// Agent key as printed by `discover`
        key: String,

        /// Conversation id to resume
        #[arg(long)]
        resume: Option<String>,
    },

    /// Kill an agent's session and remove its log
    Kill {
        /// Agent key as printed by `discover`
        key: String,
    },
}
