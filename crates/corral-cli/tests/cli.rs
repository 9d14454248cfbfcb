use assert_cmd::Command;
use corral_testing::TestWorld;
use predicates::prelude::*;

const SESSION_LOG: &str = "\x1b[32m⠋\x1b[0m Thinking…\n\
||PULSE:SUMMARY Move settings into a\n\
persistent store||\n\
||STATUS: Writing the migration||\n\
⏺ Created migrations/001_settings.sql\n";

#[test]
#[allow(deprecated)]
fn test_help_lists_subcommands() {
    Command::cargo_bin("corral")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("snapshot"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("transcript"));
}

#[test]
fn test_snapshot_json() {
    let world = TestWorld::new().with_format("json");
    let log = world.write_log("claude_corral_api.log", SESSION_LOG).unwrap();

    let result = world
        .run(&["snapshot", log.to_str().unwrap()])
        .unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());

    let json = result.json().unwrap();
    assert_eq!(json["status"], "Writing the migration");
    assert_eq!(json["summary"], "Move settings into a persistent store");
    let lines = json["recent_lines"].as_array().unwrap();
    assert_eq!(
        lines.last().unwrap(),
        "⏺ Created migrations/001_settings.sql"
    );
}

#[test]
fn test_snapshot_of_missing_file_is_empty() {
    let world = TestWorld::new().with_format("json");
    let missing = world.log_dir().join("claude_corral_gone.log");

    let result = world
        .run(&["snapshot", missing.to_str().unwrap()])
        .unwrap();
    assert!(result.success());

    let json = result.json().unwrap();
    assert!(json["status"].is_null());
    assert_eq!(json["recent_lines"].as_array().unwrap().len(), 0);
}

#[test]
fn test_tail_once_plain() {
    let world = TestWorld::new();
    let log = world.write_log("claude_corral_api.log", SESSION_LOG).unwrap();

    let result = world
        .run(&["tail", "--once", log.to_str().unwrap()])
        .unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());

    let lines: Vec<&str> = result.stdout().lines().collect();
    assert_eq!(
        lines,
        vec![
            " ⠋  Thinking…",
            "[SUMMARY] Move settings into a persistent store",
            "[STATUS] Writing the migration",
            "⏺ Created migrations/001_settings.sql",
        ]
    );
}

#[test]
fn test_tail_once_json_lines() {
    let world = TestWorld::new().with_format("json");
    let log = world
        .write_log("claude_corral_api.log", "||TASK: Add settings table||\n")
        .unwrap();

    let result = world
        .run(&["tail", "--once", log.to_str().unwrap()])
        .unwrap();
    assert!(result.success());
    assert_eq!(
        result.stdout().trim(),
        r#"{"type":"task","title":"Add settings table"}"#
    );
}

#[test]
fn test_tail_once_flushes_unterminated_last_line() {
    let world = TestWorld::new().with_format("json");
    let log = world
        .write_log("claude_corral_api.log", "working\n||STATUS: Almost done||")
        .unwrap();

    let result = world
        .run(&["tail", "--once", log.to_str().unwrap()])
        .unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());

    let lines: Vec<&str> = result.stdout().lines().collect();
    assert_eq!(
        lines,
        vec![
            r#"{"type":"raw","text":"working"}"#,
            r#"{"type":"status","text":"Almost done"}"#,
        ]
    );
}

#[test]
fn test_transcript_from_path() {
    let world = TestWorld::new().with_format("json");
    let transcript = world.temp_dir().join("session.jsonl");
    std::fs::write(
        &transcript,
        concat!(
            r#"{"type":"user","message":{"role":"user","content":"Add a settings table"}}"#,
            "\n",
            r#"{"type":"assistant","message":{"content":[{"type":"text","text":"On it. ||STATUS: Planning||"},{"type":"tool_use","id":"t1","name":"Read","input":{"file_path":"/src/db.rs"}}]}}"#,
            "\n",
        ),
    )
    .unwrap();

    let result = world
        .run(&["transcript", transcript.to_str().unwrap()])
        .unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());

    let events: Vec<serde_json::Value> = result
        .stdout()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["type"], "user");
    assert_eq!(events[1]["text"], "On it.");
    assert_eq!(events[2]["input_summary"], "/src/db.rs");
}

#[test]
fn test_discover_without_tmux_server() {
    let world = TestWorld::new().with_format("json");
    world.write_log("claude_corral_api.log", "hello\n").unwrap();

    let result = world
        .run(&["--tmux-socket", "corral-test-no-server", "discover"])
        .unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());
    assert_eq!(result.json().unwrap(), serde_json::json!([]));
    // A failed pane query never collects logs.
    assert!(world.log_dir().join("claude_corral_api.log").exists());
}
