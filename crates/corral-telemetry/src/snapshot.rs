//! Bounded backward scan of a log file.
//!
//! Answers "what is this agent doing right now" without reading whole logs:
//! chunks are read from the end until the newest STATUS, the newest SUMMARY
//! and enough display lines have been seen, or the byte budget runs out.

use corral_types::{LogSnapshot, MarkerKind};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::ansi::{split_lines, strip_ansi};
use crate::markers::{display_text, extract_markers};
use crate::rejoin::{JoinedLine, MAX_JOIN, rejoin_lines};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotOptions {
    pub max_lines: usize,
    pub max_bytes_backward: u64,
    pub chunk_size: usize,
    pub head_bytes: usize,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            max_lines: 200,
            max_bytes_backward: 4 * 1024 * 1024,
            chunk_size: 4096,
            head_bytes: 16 * 1024,
        }
    }
}

/// Snapshot `path` on the blocking pool.
pub async fn snapshot(path: impl Into<PathBuf>, options: &SnapshotOptions) -> LogSnapshot {
    let path = path.into();
    let options = options.clone();
    match tokio::task::spawn_blocking(move || read_snapshot(&path, &options)).await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            tracing::warn!(error = %err, "snapshot task failed");
            LogSnapshot::default()
        }
    }
}

/// Snapshot `path`. Unreadable files give the zero-value snapshot.
pub fn read_snapshot(path: &Path, options: &SnapshotOptions) -> LogSnapshot {
    match scan(path, options) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "snapshot failed");
            LogSnapshot::default()
        }
    }
}

struct Collector {
    status: Option<String>,
    summary: Option<String>,
    recent: VecDeque<String>,
    max_lines: usize,
}

impl Collector {
    fn new(max_lines: usize) -> Self {
        Self {
            status: None,
            summary: None,
            recent: VecDeque::new(),
            max_lines,
        }
    }

    fn done(&self) -> bool {
        self.status.is_some() && self.summary.is_some() && self.recent.len() >= self.max_lines
    }

    /// Lines arrive newest first.
    fn observe(&mut self, line: &str) {
        if self.status.is_none() || self.summary.is_none() {
            for (kind, payload) in extract_markers(line).into_iter().rev() {
                match kind {
                    MarkerKind::Status if self.status.is_none() => self.status = Some(payload),
                    MarkerKind::Summary if self.summary.is_none() => self.summary = Some(payload),
                    _ => {}
                }
            }
        }

        if self.recent.len() < self.max_lines
            && let Some(text) = display_text(line)
        {
            self.recent.push_front(text);
        }
    }

    fn consume(&mut self, lines: &[JoinedLine]) {
        for line in lines.iter().rev() {
            if self.done() {
                return;
            }
            self.observe(&line.text);
        }
    }
}

/// Rejoin a batch and hold back its leading lines, which may continue a
/// marker opened in the older, not yet read, part of the file.
fn hold_back_head(batch: Vec<String>) -> (Vec<String>, Vec<JoinedLine>) {
    let joined = rejoin_lines(&batch);
    let cut = joined
        .iter()
        .take_while(|line| line.span.first < MAX_JOIN - 1)
        .last()
        .map(|line| line.span.last + 1)
        .unwrap_or(0);

    let ready = joined
        .into_iter()
        .filter(|line| line.span.first >= cut)
        .collect();
    let mut held = batch;
    held.truncate(cut);
    (held, ready)
}

fn normalized_lines(bytes: &[u8]) -> Vec<String> {
    let text = strip_ansi(&String::from_utf8_lossy(bytes));
    split_lines(&text).into_iter().map(str::to_string).collect()
}

fn scan(path: &Path, options: &SnapshotOptions) -> io::Result<LogSnapshot> {
    let mut file = File::open(path)?;
    let meta = file.metadata()?;

    let mut collector = Collector::new(options.max_lines);
    let chunk_size = options.chunk_size.max(1) as u64;
    let mut pos = meta.len();
    let mut budget = options.max_bytes_backward;
    let mut leftover: Vec<u8> = Vec::new();
    let mut held: Vec<String> = Vec::new();

    while pos > 0 && budget > 0 && !collector.done() {
        let read = chunk_size.min(pos).min(budget);
        pos -= read;
        budget -= read;

        file.seek(SeekFrom::Start(pos))?;
        let mut chunk = vec![0u8; read as usize];
        file.read_exact(&mut chunk)?;
        chunk.extend_from_slice(&leftover);

        // Everything before the first newline may be the tail of an
        // unread line, unless the file start was reached.
        let complete = if pos == 0 {
            leftover = Vec::new();
            chunk
        } else {
            match chunk.iter().position(|&b| b == b'\n') {
                Some(idx) => {
                    let rest = chunk.split_off(idx + 1);
                    chunk.pop();
                    leftover = chunk;
                    rest
                }
                None => {
                    leftover = chunk;
                    continue;
                }
            }
        };

        let mut batch = normalized_lines(&complete);
        batch.append(&mut held);

        if pos == 0 {
            collector.consume(&rejoin_lines(&batch));
        } else {
            let (head, ready) = hold_back_head(batch);
            held = head;
            collector.consume(&ready);
        }
    }

    if !held.is_empty() && !collector.done() {
        collector.consume(&rejoin_lines(&held));
    }

    if collector.summary.is_none() && pos > 0 {
        collector.summary = head_summary(&mut file, options.head_bytes)?;
    }

    let staleness = meta
        .modified()
        .ok()
        .map(|mtime| {
            SystemTime::now()
                .duration_since(mtime)
                .map(|age| age.as_secs_f64())
                .unwrap_or(0.0)
        })
        .unwrap_or(0.0);

    Ok(LogSnapshot {
        status: collector.status,
        summary: collector.summary,
        recent_lines: collector.recent.into(),
        staleness_seconds: Some(staleness),
    })
}

/// Last SUMMARY in the first `head_bytes` of the file. Agents usually emit
/// their task summary once, near the start of a session.
fn head_summary(file: &mut File, head_bytes: usize) -> io::Result<Option<String>> {
    file.seek(SeekFrom::Start(0))?;
    let mut head = Vec::with_capacity(head_bytes);
    file.by_ref().take(head_bytes as u64).read_to_end(&mut head)?;

    let summary = rejoin_lines(&normalized_lines(&head))
        .iter()
        .flat_map(|line| extract_markers(&line.text))
        .filter(|(kind, _)| *kind == MarkerKind::Summary)
        .map(|(_, payload)| payload)
        .last();
    Ok(summary)
}
