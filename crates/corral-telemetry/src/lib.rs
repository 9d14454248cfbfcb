//! Telemetry extraction from agent terminal output.
//!
//! Raw pane output is normalized ([`ansi`]), re-assembled where the terminal
//! hard-wrapped a marker ([`rejoin`]), scanned for `||TYPE payload||` markers
//! ([`markers`]) and filtered for display ([`noise`]). [`tailer`] applies the
//! pipeline incrementally, [`snapshot`] answers "what is this agent doing now"
//! with a bounded backward read, and [`transcript`] follows the structured
//! JSONL transcript written next to the terminal log.

pub mod ansi;
pub mod markers;
pub mod noise;
pub mod rejoin;
pub mod snapshot;
pub mod tailer;
pub mod transcript;

pub use ansi::{split_lines, strip_ansi};
pub use markers::{clean_match, display_text, extract_markers, scan_markers, strip_markers};
pub use noise::{classify, is_noise};
pub use rejoin::{JoinedLine, MAX_JOIN, Rejoiner, rejoin_lines};
pub use snapshot::{SnapshotOptions, read_snapshot, snapshot};
pub use tailer::{TailState, tail};
pub use transcript::{TranscriptReader, find_transcript};
