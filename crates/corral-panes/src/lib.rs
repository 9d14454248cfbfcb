//! Panes, identities and the tmux seam.
//!
//! Every tmux interaction goes through [`Multiplexer`], so discovery,
//! resolution and lifecycle operations can be driven by a scripted fake.

pub mod discovery;
pub mod error;
pub mod lifecycle;
pub mod mux;
pub mod naming;
pub mod resolver;

pub use discovery::{DiscoveryConfig, discover_agents, try_discover_agents};
pub use error::{Error, Result};
pub use lifecycle::{
    LaunchRequest, RestartRequest, capture_pane, kill, launch, restart, send_keys, send_text,
};
pub use mux::{CommandOutput, Multiplexer, Tmux, exec, list_panes};
pub use resolver::{MatchTier, PaneQuery, find_pane, resolve_pane, resolve_pane_tier};
