//! Incremental log tailing.
//!
//! A [`TailState`] follows one log file from its end, reading only what was
//! appended since the previous poll. It is owned by exactly one caller; no
//! state is shared between tails of the same path.

use corral_types::{Marker, TailEvent};
use futures::Stream;
use std::collections::VecDeque;
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::ansi::{split_lines, strip_ansi};
use crate::markers::{display_text, extract_markers};
use crate::rejoin::{JoinedLine, Rejoiner, has_unclosed_opener};

/// Bytes after the last newline are held back until the line completes, up
/// to this size.
const MAX_CARRY_BYTES: usize = 64 * 1024;

/// Upper bound on bytes consumed by a single poll. A larger backlog is
/// drained over subsequent polls.
const MAX_READ_PER_POLL: u64 = 4 * 1024 * 1024;

#[derive(Debug)]
pub struct TailState {
    path: PathBuf,
    offset: u64,
    last_size: u64,
    partial: Vec<u8>,
    rejoiner: Rejoiner,
    seen: bool,
    vanished: bool,
}

impl TailState {
    /// Start tailing at the current end of `path`. A file that does not
    /// exist yet is read from its first byte once it appears.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (size, seen) = match tokio::fs::metadata(&path).await {
            Ok(meta) => (meta.len(), true),
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "log not readable yet");
                (0, false)
            }
        };

        Self {
            path,
            offset: size,
            last_size: size,
            partial: Vec::new(),
            rejoiner: Rejoiner::new(),
            seen,
            vanished: false,
        }
    }

    /// Tail `path` from its first byte, for logs created by this process.
    pub fn from_start(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            offset: 0,
            last_size: 0,
            partial: Vec::new(),
            rejoiner: Rejoiner::new(),
            seen: false,
            vanished: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn last_size(&self) -> u64 {
        self.last_size
    }

    /// The file existed at some point and is gone now.
    pub fn is_vanished(&self) -> bool {
        self.vanished
    }

    /// Read whatever was appended since the last poll and turn it into
    /// events, in file order. IO failures yield no events.
    pub async fn poll(&mut self) -> Vec<TailEvent> {
        let size = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta.len(),
            Err(err) => {
                if err.kind() == io::ErrorKind::NotFound && self.seen {
                    self.vanished = true;
                }
                tracing::debug!(path = %self.path.display(), error = %err, "stat failed");
                return Vec::new();
            }
        };
        self.seen = true;
        self.vanished = false;
        self.last_size = size;

        if size < self.offset {
            tracing::debug!(
                path = %self.path.display(),
                offset = self.offset,
                size,
                "log shrank, rewinding to start"
            );
            self.rewind();
            return Vec::new();
        }
        if size == self.offset {
            return Vec::new();
        }

        let end = size.min(self.offset + MAX_READ_PER_POLL);
        let chunk = match self.read_range(end).await {
            Ok(chunk) => chunk,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), error = %err, "read failed");
                return Vec::new();
            }
        };
        self.offset += chunk.len() as u64;
        self.process(&chunk)
    }

    fn rewind(&mut self) {
        self.offset = 0;
        self.partial.clear();
        self.rejoiner = Rejoiner::new();
    }

    async fn read_range(&self, end: u64) -> io::Result<Vec<u8>> {
        let mut file = File::open(&self.path).await?;
        file.seek(SeekFrom::Start(self.offset)).await?;

        let mut buf = Vec::with_capacity((end - self.offset) as usize);
        file.take(end - self.offset).read_to_end(&mut buf).await?;
        Ok(buf)
    }

    fn process(&mut self, chunk: &[u8]) -> Vec<TailEvent> {
        self.partial.extend_from_slice(chunk);

        let complete_len = match self.partial.iter().rposition(|&b| b == b'\n') {
            Some(pos) => pos + 1,
            None if self.partial.len() > MAX_CARRY_BYTES => self.partial.len(),
            None => 0,
        };
        let rest = self.partial.split_off(complete_len);
        let complete = std::mem::replace(&mut self.partial, rest);

        let mut events = Vec::new();
        self.push_text(&String::from_utf8_lossy(&complete), &mut events);

        if let Some(text) = self.closed_partial() {
            self.partial.clear();
            self.push_text(&text, &mut events);
        }
        events
    }

    /// The unterminated tail, if it already ends a marker (its own, or one
    /// the rejoiner holds open). A TUI may leave its status line without a
    /// newline for a long time. Anything else waits for its newline.
    fn closed_partial(&self) -> Option<String> {
        let raw = std::str::from_utf8(&self.partial).ok()?;
        let text = strip_ansi(raw);
        let line = split_lines(&text).pop()?;
        let closed = line.trim_end().ends_with("||")
            && !has_unclosed_opener(line)
            && (self.rejoiner.is_open() || !extract_markers(line).is_empty());
        closed.then(|| raw.to_string())
    }

    fn push_text(&mut self, raw: &str, events: &mut Vec<TailEvent>) {
        let text = strip_ansi(raw);
        for line in split_lines(&text) {
            if let Some(joined) = self.rejoiner.push(line) {
                line_events(&joined, events);
            }
        }
    }

    /// Flush the unterminated tail and any open marker. Call when no more
    /// output is expected, e.g. after a one-shot read of the whole file.
    pub fn finish(&mut self) -> Vec<TailEvent> {
        let partial = std::mem::take(&mut self.partial);
        let mut events = Vec::new();
        self.push_text(&String::from_utf8_lossy(&partial), &mut events);
        if let Some(joined) = self.rejoiner.finish() {
            line_events(&joined, &mut events);
        }
        events
    }
}

/// Marker events for a logical line, then its display text if anything but
/// markers and chrome remains.
fn line_events(line: &JoinedLine, events: &mut Vec<TailEvent>) {
    events.extend(extract_markers(&line.text).into_iter().map(|(kind, payload)| {
        TailEvent::from(Marker {
            kind,
            payload,
            span: line.span,
        })
    }));

    if let Some(text) = display_text(&line.text) {
        events.push(TailEvent::raw(text));
    }
}

/// Follow `path` from its current end, polling every `interval`.
///
/// Each call builds an independent stream with its own [`TailState`].
pub fn tail(path: impl Into<PathBuf>, interval: Duration) -> impl Stream<Item = TailEvent> {
    let path = path.into();

    futures::stream::unfold(
        (
            None::<TailState>,
            None::<tokio::time::Interval>,
            VecDeque::new(),
            path,
        ),
        move |(mut state, mut ticker, mut pending, path)| async move {
            loop {
                if let Some(event) = pending.pop_front() {
                    return Some((event, (state, ticker, pending, path)));
                }

                if state.is_none() {
                    state = Some(TailState::open(path.clone()).await);
                }
                let clock = ticker.get_or_insert_with(|| {
                    let mut clock = tokio::time::interval(interval);
                    clock.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                    clock
                });
                clock.tick().await;
                if let Some(tail) = state.as_mut() {
                    pending.extend(tail.poll().await);
                }
            }
        },
    )
}
