//! Re-assembly of markers the terminal hard-wrapped at pane width.
//!
//! A marker split across physical lines arrives as an opening fragment
//! (`||TYPE ...` with no closer), zero or more continuation fragments and a
//! closing fragment ending in `||`. [`Rejoiner`] glues those back into one
//! logical line so extraction can run on single lines.

use corral_types::LineSpan;
use regex::Regex;
use std::sync::LazyLock;

use crate::noise::GLYPH_CLASS;

/// Upper bound on physical lines folded into one logical line.
pub const MAX_JOIN: usize = 5;

static LEADING_GLYPHS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^[\s{}]+", GLYPH_CLASS)).unwrap());

static OPENER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|\|(?:PULSE:[^\s:|]+|[A-Z][A-Z0-9_]*)(?::|\s)").unwrap());

/// Drop a leading run of spinner/bullet glyphs and whitespace.
pub(crate) fn strip_leading_glyphs(line: &str) -> &str {
    match LEADING_GLYPHS.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

/// True if some marker opener in `text` has no `||` after it.
pub(crate) fn has_unclosed_opener(text: &str) -> bool {
    OPENER
        .find_iter(text)
        .any(|m| !text[m.end()..].contains("||"))
}

/// A logical line and the physical lines it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedLine {
    pub text: String,
    pub span: LineSpan,
}

/// Incremental rejoiner. Holds at most one open marker accumulator, which
/// is what lets a tailer carry a half-written marker across polls.
#[derive(Debug, Clone, Default)]
pub struct Rejoiner {
    acc: String,
    first: usize,
    pending: usize,
    next_line: usize,
}

impl Rejoiner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number physical lines from `line` instead of 0.
    pub fn starting_at(line: usize) -> Self {
        Self {
            next_line: line,
            ..Self::default()
        }
    }

    pub fn is_open(&self) -> bool {
        self.pending > 0
    }

    /// Physical line number the next pushed line will get.
    pub fn next_line(&self) -> usize {
        self.next_line
    }

    /// Feed one physical line. Returns a logical line when one is complete.
    pub fn push(&mut self, line: &str) -> Option<JoinedLine> {
        let line_no = self.next_line;
        self.next_line += 1;
        let body = strip_leading_glyphs(line);

        if !self.is_open() {
            if !has_unclosed_opener(body) {
                return Some(JoinedLine {
                    text: line.to_string(),
                    span: LineSpan::single(line_no),
                });
            }
            self.acc = body.trim_end().to_string();
            self.first = line_no;
            self.pending = 1;
            return None;
        }

        let piece = body.trim();
        if !piece.is_empty() {
            self.acc.push(' ');
            self.acc.push_str(piece);
        }
        self.pending += 1;

        if !has_unclosed_opener(&self.acc) || self.pending >= MAX_JOIN {
            return self.flush(line_no);
        }
        None
    }

    /// Flush an open accumulator as-is. Call at end of input.
    pub fn finish(&mut self) -> Option<JoinedLine> {
        if !self.is_open() {
            return None;
        }
        let last = self.next_line.saturating_sub(1);
        self.flush(last)
    }

    fn flush(&mut self, last: usize) -> Option<JoinedLine> {
        self.pending = 0;
        Some(JoinedLine {
            text: std::mem::take(&mut self.acc),
            span: LineSpan {
                first: self.first,
                last,
            },
        })
    }
}

/// Rejoin a complete batch of normalized lines.
pub fn rejoin_lines<S: AsRef<str>>(lines: &[S]) -> Vec<JoinedLine> {
    let mut rejoiner = Rejoiner::new();
    let mut out: Vec<JoinedLine> = lines
        .iter()
        .filter_map(|line| rejoiner.push(line.as_ref()))
        .collect();
    out.extend(rejoiner.finish());
    out
}
