use std::fmt;

/// Result type for corral-panes operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while talking to the multiplexer
#[derive(Debug)]
pub enum Error {
    /// IO operation failed (spawning tmux, touching log files)
    Io(std::io::Error),

    /// tmux ran but reported failure
    Command { args: Vec<String>, stderr: String },

    /// tmux output could not be interpreted
    UnexpectedOutput(String),

    /// The request cannot be carried out for this agent type
    Unsupported(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Command { args, stderr } => {
                write!(f, "tmux {} failed: {}", args.join(" "), stderr)
            }
            Error::UnexpectedOutput(msg) => write!(f, "Unexpected tmux output: {}", msg),
            Error::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Command { .. } | Error::UnexpectedOutput(_) | Error::Unsupported(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
