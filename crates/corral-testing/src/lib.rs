//! Testing infrastructure for corral integration tests.
//!
//! - `LogFixture`: an isolated log directory with helpers to grow, truncate
//!   and age agent log files
//! - `FakeMux`: a scripted tmux that records every command it receives
//! - `TestWorld`: isolated data and log directories for driving the binary

pub mod fixtures;
pub mod mux;
pub mod world;

pub use fixtures::LogFixture;
pub use mux::{FakeMux, pane};
pub use world::{CliResult, TestWorld};
