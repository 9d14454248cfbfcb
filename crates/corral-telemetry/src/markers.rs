use corral_types::{Marker, MarkerKind};
use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::noise::classify;
use crate::rejoin::JoinedLine;

// ||TYPE[:][ ]payload|| or ||PULSE:<any tag>[:][ ]payload||
static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\|\|(?:PULSE:(?P<pulse>[^\s:|]+)|(?P<tag>[A-Z][A-Z0-9_]*))(?::\s*|\s+)(?P<payload>.*?)\|\|",
    )
    .unwrap()
});

/// Collapse whitespace runs to single spaces and trim.
pub fn clean_match(payload: &str) -> String {
    payload.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn accepted_kind(caps: &Captures<'_>) -> Option<MarkerKind> {
    if let Some(tag) = caps.name("pulse") {
        return Some(MarkerKind::from_tag(tag.as_str()));
    }
    let kind = MarkerKind::from_tag(&caps["tag"]);
    kind.accepts_bare_form().then_some(kind)
}

/// Extract markers from one logical (already rejoined) line, in textual
/// order. Markers with an empty payload are dropped.
pub fn extract_markers(line: &str) -> Vec<(MarkerKind, String)> {
    MARKER
        .captures_iter(line)
        .filter_map(|caps| {
            let kind = accepted_kind(&caps)?;
            let payload = clean_match(&caps["payload"]);
            (!payload.is_empty()).then_some((kind, payload))
        })
        .collect()
}

/// Extract markers from rejoined lines, keeping each one's physical span.
pub fn scan_markers(lines: &[JoinedLine]) -> Vec<Marker> {
    lines
        .iter()
        .flat_map(|line| {
            extract_markers(&line.text)
                .into_iter()
                .map(|(kind, payload)| Marker {
                    kind,
                    payload,
                    span: line.span,
                })
        })
        .collect()
}

/// Remove complete markers from free text.
pub fn strip_markers(text: &str) -> String {
    MARKER
        .replace_all(text, |caps: &Captures<'_>| match accepted_kind(caps) {
            Some(_) => String::new(),
            None => caps[0].to_string(),
        })
        .trim()
        .to_string()
}

/// Display form of a logical line: markers removed, `None` when nothing
/// but chrome is left.
pub fn display_text(line: &str) -> Option<String> {
    let text = if MARKER.is_match(line) {
        strip_markers(line)
    } else {
        line.trim_end().to_string()
    };
    let line = classify(&text);
    (!line.is_noise).then_some(line.text)
}
