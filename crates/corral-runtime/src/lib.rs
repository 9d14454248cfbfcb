//! Live agent registry for corral.
//!
//! [`AgentRegistry`] owns one entry per discovered agent: its current
//! session epoch, the tail state of its log and its latest snapshot. Two
//! periodic ticks drive it, discovery and tailing, and both publish
//! [`RegistryEvent`]s describing only what changed.

pub mod config;
pub mod dedup;
pub mod error;
pub mod registry;

pub use config::{Config, resolve_data_dir};
pub use dedup::LastSeen;
pub use error::{Error, Result};
pub use registry::{AgentRegistry, RegistryCommand, RegistryEvent};
