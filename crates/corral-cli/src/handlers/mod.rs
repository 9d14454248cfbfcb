pub mod discover;
pub mod lifecycle;
pub mod resolve;
pub mod snapshot;
pub mod tail;
pub mod transcript;
pub mod watch;
