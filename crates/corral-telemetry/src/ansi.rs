use regex::Regex;
use std::sync::LazyLock;

// OSC first: its introducer `ESC ]` also matches the two-byte form.
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b\[[0-?]*[ -/]*[@-~]|\x1b[@-Z\\-_]").unwrap()
});

static CONTROL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x08\x0b\x0c\x0e-\x1f\x7f]").unwrap());

/// Replace escape sequences with a single space and drop remaining
/// non-printable control bytes. `\n`, `\r` and `\t` survive.
///
/// Replacing with a space rather than nothing keeps words apart when the
/// terminal used cursor movement instead of literal spaces.
pub fn strip_ansi(text: &str) -> String {
    let spaced = ANSI_ESCAPE.replace_all(text, " ");
    CONTROL_CHARS.replace_all(&spaced, "").into_owned()
}

/// Split on `\n`, `\r\n` and lone `\r`. A trailing terminator does not
/// produce an empty final line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}
