use corral_types::LogLine;
use regex::Regex;
use std::sync::LazyLock;

/// Spinner and bullet glyphs agent TUIs draw in front of (or instead of)
/// content: dingbat stars, media controls, circles, small triangles,
/// braille spinners, middle dot and bullet. Written as a regex class body.
pub(crate) const GLYPH_CLASS: &str = concat!(
    r"\x{2736}-\x{273F}",
    r"\x{23CF}\x{23F4}\x{23F5}\x{23F9}\x{23FA}",
    r"\x{26A1}",
    r"\x{25CB}\x{25C9}\x{25CC}\x{25CE}\x{25CF}\x{25D0}-\x{25D3}",
    r"\x{25AA}\x{25AB}\x{25B8}-\x{25BB}",
    r"\x{2800}-\x{28FF}",
    r"\x{00B7}\x{2022}",
);

static BOX_DRAWING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s\x{2500}-\x{257F}]+$").unwrap());

static SPINNER_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^[\s{}]+$", GLYPH_CLASS)).unwrap());

static STATUS_BAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"worktree:|branch:|model:|ctx:|in:\d|out:\d|cache:\d|shift\+tab|accept edits")
        .unwrap()
});

static BARE_PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[\x{276F}\x{203A}>$#%]\s*$").unwrap());

static OSC_TITLE_FRAGMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+;").unwrap());

static BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\x{00B7}\x{2022}.\s]*\d+[\x{00B7}\x{2022}.\s]*$").unwrap());

static CHROME_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)real-time output streaming|streaming response").unwrap());

/// Whether a normalized line is terminal chrome rather than agent output.
///
/// Only used for display. Marker extraction never consults this.
pub fn is_noise(line: &str) -> bool {
    let stripped = line.trim();
    if stripped.is_empty() {
        return true;
    }

    if BOX_DRAWING.is_match(stripped)
        || SPINNER_ONLY.is_match(stripped)
        || STATUS_BAR.is_match(stripped)
        || BARE_PROMPT.is_match(stripped)
        || OSC_TITLE_FRAGMENT.is_match(stripped)
        || BARE_NUMBER.is_match(stripped)
        || CHROME_PHRASE.is_match(stripped)
    {
        return true;
    }

    stripped.chars().count() <= 2 && !stripped.chars().all(char::is_alphanumeric)
}

/// Pair a display line with its noise verdict.
pub fn classify(line: &str) -> LogLine {
    LogLine {
        text: line.trim_end().to_string(),
        is_noise: is_noise(line),
    }
}
