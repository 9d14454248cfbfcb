//! A scripted stand-in for tmux.
//!
//! `FakeMux` keeps a pane list and applies the commands corral issues to it:
//! sessions can be created, renamed and killed, pane titles set and
//! scrollback captured. Every command is journaled so tests can assert on
//! the exact sequence sent.

use corral_panes::{CommandOutput, Multiplexer};
use corral_types::PaneRecord;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Build a pane whose target is `{session}:0.0`.
pub fn pane(title: &str, session: &str, working_directory: &str) -> PaneRecord {
    PaneRecord {
        title: title.to_string(),
        session_name: session.to_string(),
        target: format!("{}:0.0", session),
        working_directory: PathBuf::from(working_directory),
    }
}

#[derive(Default)]
struct State {
    panes: Vec<PaneRecord>,
    journal: Vec<Vec<String>>,
    fail_list: bool,
    scrollback: HashMap<String, String>,
}

#[derive(Default)]
pub struct FakeMux {
    state: Mutex<State>,
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let idx = args.iter().position(|arg| arg == flag)?;
    args.get(idx + 1).map(String::as_str)
}

fn ok(stdout: impl Into<String>) -> CommandOutput {
    CommandOutput {
        success: true,
        stdout: stdout.into(),
        stderr: String::new(),
    }
}

fn failed(stderr: impl Into<String>) -> CommandOutput {
    CommandOutput {
        success: false,
        stdout: String::new(),
        stderr: stderr.into(),
    }
}

impl FakeMux {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pane(self, pane: PaneRecord) -> Self {
        self.add_pane(pane);
        self
    }

    pub fn add_pane(&self, pane: PaneRecord) {
        self.lock().panes.push(pane);
    }

    /// Drop every pane of `session`, as if it exited.
    pub fn close_session(&self, session: &str) {
        self.lock().panes.retain(|p| p.session_name != session);
    }

    /// Make `list-panes` fail, as when no tmux server is running.
    pub fn fail_list_panes(&self, fail: bool) {
        self.lock().fail_list = fail;
    }

    pub fn set_scrollback(&self, target: &str, text: &str) {
        self.lock()
            .scrollback
            .insert(target.to_string(), text.to_string());
    }

    pub fn panes(&self) -> Vec<PaneRecord> {
        self.lock().panes.clone()
    }

    /// Every command received, in order.
    pub fn journal(&self) -> Vec<Vec<String>> {
        self.lock().journal.clone()
    }

    /// Received commands whose subcommand is `name`.
    pub fn commands(&self, name: &str) -> Vec<Vec<String>> {
        self.lock()
            .journal
            .iter()
            .filter(|args| args.first().is_some_and(|first| first == name))
            .cloned()
            .collect()
    }

    /// Text typed into `target` with `send-keys -l`.
    pub fn typed(&self, target: &str) -> Vec<String> {
        self.commands("send-keys")
            .into_iter()
            .filter(|args| flag_value(args, "-t") == Some(target))
            .filter_map(|args| flag_value(&args, "-l").map(str::to_string))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("FakeMux state poisoned")
    }

    fn apply(&self, args: &[String]) -> CommandOutput {
        let mut state = self.lock();
        state.journal.push(args.to_vec());

        match args.first().map(String::as_str) {
            Some("list-panes") => {
                if state.fail_list {
                    return failed("no server running on /tmp/tmux-1000/default");
                }
                let stdout: String = state
                    .panes
                    .iter()
                    .map(|p| {
                        format!(
                            "{}\t{}\t{}\t{}\n",
                            p.title,
                            p.session_name,
                            p.target,
                            p.working_directory.display()
                        )
                    })
                    .collect();
                ok(stdout)
            }
            Some("new-session") => {
                let Some(session) = flag_value(args, "-s") else {
                    return failed("new-session without -s");
                };
                if state.panes.iter().any(|p| p.session_name == session) {
                    return failed(format!("duplicate session: {}", session));
                }
                let created = pane("", session, flag_value(args, "-c").unwrap_or(""));
                let stdout = if args.iter().any(|arg| arg == "-P") {
                    format!("{}\n", created.target)
                } else {
                    String::new()
                };
                state.panes.push(created);
                ok(stdout)
            }
            Some("rename-session") => {
                let (Some(old), Some(new)) = (flag_value(args, "-t"), args.last()) else {
                    return failed("rename-session needs -t and a name");
                };
                let mut found = false;
                for p in state.panes.iter_mut().filter(|p| p.session_name == old) {
                    *p = p.renamed(new);
                    found = true;
                }
                if found {
                    ok("")
                } else {
                    failed(format!("can't find session: {}", old))
                }
            }
            Some("kill-session") => {
                let Some(session) = flag_value(args, "-t") else {
                    return failed("kill-session without -t");
                };
                let before = state.panes.len();
                state.panes.retain(|p| p.session_name != session);
                if state.panes.len() < before {
                    ok("")
                } else {
                    failed(format!("can't find session: {}", session))
                }
            }
            Some("select-pane") => {
                if let (Some(target), Some(title)) = (flag_value(args, "-t"), flag_value(args, "-T"))
                {
                    for p in state.panes.iter_mut().filter(|p| p.target == target) {
                        p.title = title.to_string();
                    }
                }
                ok("")
            }
            Some("capture-pane") => {
                let target = flag_value(args, "-t").unwrap_or_default();
                ok(state.scrollback.get(target).cloned().unwrap_or_default())
            }
            _ => ok(""),
        }
    }
}

impl Multiplexer for FakeMux {
    fn run<'a>(&'a self, args: &'a [String]) -> BoxFuture<'a, std::io::Result<CommandOutput>> {
        let output = self.apply(args);
        Box::pin(futures::future::ready(Ok(output)))
    }
}
