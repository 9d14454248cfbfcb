use corral_telemetry::{MAX_JOIN, extract_markers, rejoin_lines, strip_ansi, split_lines};
use corral_types::MarkerKind;
use proptest::prelude::*;

fn texts(lines: &[&str]) -> Vec<String> {
    rejoin_lines(lines).into_iter().map(|l| l.text).collect()
}

#[test]
fn complete_markers_are_unchanged() {
    let lines = [
        "normal output",
        "||PULSE:STATUS Working on it||",
        "||PULSE:SUMMARY Implementing auth||",
        "more output",
    ];
    assert_eq!(texts(&lines), lines);
}

#[test]
fn mixed_complete_and_split() {
    let result = texts(&[
        "normal output",
        "||PULSE:STATUS Short status||",
        "||PULSE:SUMMARY Long summary that wraps across",
        "the terminal width boundary||",
        "more normal output",
    ]);
    assert_eq!(result.len(), 4);
    assert_eq!(result[0], "normal output");
    assert_eq!(result[1], "||PULSE:STATUS Short status||");
    assert_eq!(
        result[2],
        "||PULSE:SUMMARY Long summary that wraps across the terminal width boundary||"
    );
    assert_eq!(result[3], "more normal output");
}

#[test]
fn multiple_split_markers_in_sequence() {
    let result = texts(&[
        "||PULSE:SUMMARY First long summary that wraps",
        "across the line||",
        "||PULSE:STATUS Also a long status that wraps",
        "to the next line||",
    ]);
    assert_eq!(result.len(), 2);
    assert_eq!(
        extract_markers(&result[0]),
        vec![(
            MarkerKind::Summary,
            "First long summary that wraps across the line".to_string()
        )]
    );
    assert_eq!(
        extract_markers(&result[1]),
        vec![(
            MarkerKind::Status,
            "Also a long status that wraps to the next line".to_string()
        )]
    );
}

#[test]
fn indented_opener_is_rejoined() {
    let result = texts(&[
        "  ||PULSE:SUMMARY Moving settings button to top gear icon and creating",
        "persistent settings store in database||",
    ]);
    assert_eq!(result.len(), 1);
    assert!(result[0].starts_with("||PULSE:SUMMARY"));
    assert!(result[0].ends_with("database||"));
}

#[test]
fn empty_input() {
    assert!(rejoin_lines::<&str>(&[]).is_empty());
}

#[test]
fn wrapped_markers_in_raw_terminal_text() {
    let raw = "some output\r\n\
               \x1b[2m||PULSE:CONFIDENCE Low Unfamiliar with this auth library\x1b[0m\r\n\
               guessing at the API||\r\n\
               ||PULSE:STATUS Working||\r\n\
               more output\r\n";
    let text = strip_ansi(raw);
    let joined = rejoin_lines(&split_lines(&text));
    let kinds: Vec<_> = joined
        .iter()
        .flat_map(|l| extract_markers(&l.text))
        .collect();

    assert_eq!(
        kinds,
        vec![
            (
                MarkerKind::Confidence,
                "Low Unfamiliar with this auth library guessing at the API".to_string()
            ),
            (MarkerKind::Status, "Working".to_string()),
        ]
    );
}

fn split_into(words: &[String], pieces: usize) -> Vec<String> {
    let size = words.len().div_ceil(pieces);
    words.chunks(size).map(|chunk| chunk.join(" ")).collect()
}

proptest! {
    #[test]
    fn wrapped_payload_is_recovered(
        words in prop::collection::vec("[a-z]{1,8}", 1..24),
        pieces in 1usize..=MAX_JOIN,
        pulse in any::<bool>(),
    ) {
        let payload = words.join(" ");
        let prefix = if pulse { "||PULSE:STATUS " } else { "||STATUS: " };

        let mut lines = split_into(&words, pieces);
        lines[0] = format!("{}{}", prefix, lines[0]);
        let last = lines.len() - 1;
        lines[last].push_str("||");

        let joined = rejoin_lines(&lines);
        prop_assert_eq!(joined.len(), 1);
        prop_assert_eq!(
            extract_markers(&joined[0].text),
            vec![(MarkerKind::Status, payload)]
        );
    }

    #[test]
    fn unclosed_marker_never_exceeds_bound(
        extra in 0usize..20,
    ) {
        let mut lines = vec!["||PULSE:SUMMARY never closed".to_string()];
        lines.extend((0..extra).map(|i| format!("line {}", i)));

        for line in rejoin_lines(&lines) {
            prop_assert!(line.span.line_count() <= MAX_JOIN);
        }
    }
}
