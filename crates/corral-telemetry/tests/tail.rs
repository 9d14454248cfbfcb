use corral_telemetry::{TailState, tail};
use corral_types::TailEvent;
use futures::StreamExt;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

fn append(path: &Path, text: &str) {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .unwrap();
    file.write_all(text.as_bytes()).unwrap();
}

#[tokio::test]
async fn claude_session_events() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("claude_corral_api.log");
    append(&path, "history that was written before the tail opened\n");

    let mut tail = TailState::open(&path).await;
    append(
        &path,
        "\x1b[?25l\x1b[2K⠋ Thinking…\r\n\
         ⏺ I'll start by reading the config.\r\n\
         ||PULSE:STATUS Reading the config file\r\n\
         for settings||\r\n\
         ──────────────\r\n\
         \x20 ⎿  Read 42 lines\r\n\
         ||PULSE:SUMMARY Move settings into a persistent store||\r\n\
         ||TASK: Add settings table||\r\n\
         ||PULSE:CONFIDENCE High Schema is straightforward||\r\n\
         ❯ \r\n\
         \x20 model: opus  ctx: 12%\r\n",
    );

    let events = tail.poll().await;
    insta::assert_json_snapshot!("claude_session_events", events);
}

#[tokio::test]
async fn second_poll_without_writes_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("claude_corral_api.log");
    append(&path, "");

    let mut tail = TailState::open(&path).await;
    append(&path, "one\ntwo\n");
    assert_eq!(tail.poll().await.len(), 2);
    assert_eq!(tail.offset(), 8);

    assert!(tail.poll().await.is_empty());
    assert_eq!(tail.offset(), 8);
}

#[tokio::test]
async fn offset_is_monotonic_while_file_grows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("claude_corral_api.log");
    append(&path, "");

    let mut tail = TailState::open(&path).await;
    let mut last = tail.offset();
    for i in 0..5 {
        append(&path, &format!("step {}\n", i));
        tail.poll().await;
        assert!(tail.offset() > last);
        last = tail.offset();
    }
    assert_eq!(last, tail.last_size());
}

#[tokio::test]
async fn stream_yields_appended_markers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("claude_corral_api.log");
    append(&path, "old\n");

    let stream = tail(&path, Duration::from_millis(10));
    futures::pin_mut!(stream);

    let writer_path = path.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        append(&writer_path, "||STATUS: Working||\nnext step\n");
    });

    let first = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .unwrap();
    assert_eq!(
        first,
        Some(TailEvent::Status {
            text: "Working".to_string()
        })
    );
    let second = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .unwrap();
    assert_eq!(second, Some(TailEvent::raw("next step")));
}
