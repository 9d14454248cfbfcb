mod args;
mod commands;
mod context;
mod handlers;
mod logging;
pub mod types;
mod views;

pub use args::{Cli, Commands};
pub use commands::run;
