//! Incremental reader for Claude JSONL session transcripts.
//!
//! The terminal log tells us what the agent is showing; the transcript is
//! the structured record of the same conversation. Only complete lines are
//! consumed, so a transcript that is being written can be polled safely.

use corral_types::TailEvent;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::markers::strip_markers;

const MAX_RESULT_CHARS: usize = 10_000;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "kebab-case")]
enum TranscriptRecord {
    User(UserRecord),
    Assistant(AssistantRecord),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    message: UserMessage,
}

#[derive(Debug, Deserialize)]
struct UserMessage {
    #[serde(default, deserialize_with = "text_or_blocks")]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct AssistantRecord {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default, deserialize_with = "text_or_blocks")]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        #[serde(default)]
        content: Option<Value>,
        #[serde(default)]
        is_error: bool,
    },
    #[serde(other)]
    Unknown,
}

fn text_or_blocks<'de, D>(deserializer: D) -> Result<Vec<ContentBlock>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrArray {
        String(String),
        Array(Vec<ContentBlock>),
    }

    match StringOrArray::deserialize(deserializer)? {
        StringOrArray::String(text) => Ok(vec![ContentBlock::Text { text }]),
        StringOrArray::Array(blocks) => Ok(blocks),
    }
}

/// Claude's project folder name for a working directory.
pub fn encode_project_dir(working_directory: &Path) -> String {
    working_directory.to_string_lossy().replace('/', "-")
}

/// Default transcript root, `~/.claude/projects`.
pub fn default_projects_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".claude").join("projects"))
}

/// Locate `<session_id>.jsonl`, trying the working-directory hint first.
pub fn find_transcript(
    projects_dir: &Path,
    session_id: &str,
    working_directory: Option<&Path>,
) -> Option<PathBuf> {
    let file_name = format!("{}.jsonl", session_id);

    if let Some(dir) = working_directory {
        let candidate = projects_dir.join(encode_project_dir(dir)).join(&file_name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    WalkDir::new(projects_dir)
        .max_depth(2)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .find(|entry| entry.file_type().is_file() && entry.file_name() == file_name.as_str())
        .map(|entry| entry.into_path())
}

/// Compact one-line description of a tool call's input.
fn summarize_tool_input(name: &str, input: &Value) -> String {
    let field = |key: &str| input.get(key).and_then(Value::as_str).unwrap_or("");

    match name {
        "Read" | "Edit" | "Write" | "NotebookEdit" => {
            let path = match field("file_path") {
                "" => field("notebook_path"),
                path => path,
            };
            path.to_string()
        }
        "Bash" => truncate_chars(field("command"), 120, "..."),
        "Grep" | "Glob" => match field("path") {
            "" => field("pattern").to_string(),
            path => format!("{} in {}", field("pattern"), path),
        },
        "WebSearch" => field("query").to_string(),
        "WebFetch" => field("url").to_string(),
        _ => input
            .as_object()
            .and_then(|map| map.values().filter_map(Value::as_str).find(|s| !s.is_empty()))
            .map(|s| s.chars().take(100).collect())
            .unwrap_or_default(),
    }
}

fn truncate_chars(text: &str, limit: usize, suffix: &str) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}{}", &text[..idx], suffix),
        None => text.to_string(),
    }
}

fn result_text(content: Option<Value>) -> String {
    match content {
        Some(Value::String(text)) => text,
        Some(Value::Array(parts)) => parts
            .iter()
            .filter(|part| part.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

/// Follows one transcript file from its first byte.
#[derive(Debug)]
pub struct TranscriptReader {
    path: PathBuf,
    offset: u64,
    tool_names: HashMap<String, String>,
}

impl TranscriptReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            offset: 0,
            tool_names: HashMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the complete lines appended since the last call.
    pub fn read_new(&mut self) -> io::Result<Vec<TailEvent>> {
        let mut file = File::open(&self.path)?;
        let size = file.metadata()?.len();
        if size < self.offset {
            self.offset = 0;
            self.tool_names.clear();
        }
        if size == self.offset {
            return Ok(Vec::new());
        }

        file.seek(SeekFrom::Start(self.offset))?;
        let mut buf = Vec::new();
        file.take(size - self.offset).read_to_end(&mut buf)?;

        let Some(last_newline) = buf.iter().rposition(|&b| b == b'\n') else {
            return Ok(Vec::new());
        };
        self.offset += (last_newline + 1) as u64;

        let text = String::from_utf8_lossy(&buf[..last_newline]);
        let mut events = Vec::new();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            match serde_json::from_str::<TranscriptRecord>(line) {
                Ok(record) => self.record_events(record, &mut events),
                Err(err) => {
                    tracing::debug!(path = %self.path.display(), error = %err, "skipping transcript line")
                }
            }
        }
        Ok(events)
    }

    fn record_events(&mut self, record: TranscriptRecord, events: &mut Vec<TailEvent>) {
        match record {
            TranscriptRecord::User(user) => {
                let mut texts = Vec::new();
                let mut results = Vec::new();
                for block in user.message.content {
                    match block {
                        ContentBlock::Text { text } => texts.push(text),
                        ContentBlock::ToolResult {
                            tool_use_id,
                            content,
                            is_error,
                        } => {
                            let content = result_text(content);
                            if content.is_empty() {
                                continue;
                            }
                            results.push(TailEvent::ToolResult {
                                tool_name: self.tool_names.get(&tool_use_id).cloned(),
                                tool_use_id,
                                content: truncate_chars(
                                    &content,
                                    MAX_RESULT_CHARS,
                                    "\n... (truncated)",
                                ),
                                is_error,
                            });
                        }
                        ContentBlock::ToolUse { .. } | ContentBlock::Unknown => {}
                    }
                }

                if !results.is_empty() {
                    events.extend(results);
                    return;
                }
                let text = texts.join("\n");
                if !text.trim().is_empty() {
                    events.push(TailEvent::User { text });
                }
            }
            TranscriptRecord::Assistant(assistant) => {
                let mut texts = Vec::new();
                let mut tool_uses = Vec::new();
                for block in assistant.message.content {
                    match block {
                        ContentBlock::Text { text } => texts.push(text),
                        ContentBlock::ToolUse { id, name, input } => {
                            self.tool_names.insert(id.clone(), name.clone());
                            tool_uses.push(TailEvent::ToolUse {
                                input_summary: summarize_tool_input(&name, &input),
                                tool_use_id: id,
                                name,
                            });
                        }
                        ContentBlock::ToolResult { .. } | ContentBlock::Unknown => {}
                    }
                }

                let text = strip_markers(&texts.join("\n"));
                if !text.is_empty() {
                    events.push(TailEvent::Assistant { text });
                }
                events.extend(tool_uses);
            }
            TranscriptRecord::Unknown => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summarize_tool_input() {
        assert_eq!(
            summarize_tool_input("Read", &json!({"file_path": "/src/main.rs"})),
            "/src/main.rs"
        );
        assert_eq!(
            summarize_tool_input("Grep", &json!({"pattern": "TODO", "path": "src"})),
            "TODO in src"
        );
        assert_eq!(summarize_tool_input("Glob", &json!({"pattern": "*.rs"})), "*.rs");
        assert_eq!(
            summarize_tool_input("Custom", &json!({"n": 3, "label": "x"})),
            "x"
        );

        let long = "a".repeat(200);
        let summary = summarize_tool_input("Bash", &json!({ "command": long }));
        assert_eq!(summary.chars().count(), 123);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_result_text_from_blocks() {
        let content = json!([
            {"type": "text", "text": "line one"},
            {"type": "image", "source": {}},
            {"type": "text", "text": "line two"}
        ]);
        assert_eq!(result_text(Some(content)), "line one\nline two");
        assert_eq!(result_text(None), "");
    }

    #[test]
    fn test_encode_project_dir() {
        assert_eq!(
            encode_project_dir(Path::new("/home/dev/api")),
            "-home-dev-api"
        );
    }
}
