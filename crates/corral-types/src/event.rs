use serde::{Deserialize, Serialize};

use crate::marker::{Marker, MarkerKind};

/// One unit of live telemetry for an agent.
///
/// Terminal logs produce `Raw` display lines and marker-derived variants;
/// JSONL transcripts produce the conversation variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TailEvent {
    /// A non-noise display line
    Raw { text: String },

    /// `||STATUS: ...||`
    Status { text: String },

    /// `||SUMMARY: ...||`
    Summary { text: String },

    /// `||PULSE:CONFIDENCE ...||` and free-form `||PULSE:<TYPE> ...||`
    Pulse { kind: MarkerKind, text: String },

    /// `||TASK: ...||`
    Task { title: String },

    /// `||TASK_DONE: ...||`
    TaskDone { title: String },

    /// Transcript: prompt typed by the user
    User { text: String },

    /// Transcript: assistant text with protocol markers removed
    Assistant { text: String },

    /// Transcript: tool invocation requested by the assistant
    ToolUse {
        tool_use_id: String,
        name: String,
        input_summary: String,
    },

    /// Transcript: tool output returned to the assistant
    ToolResult {
        tool_use_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_name: Option<String>,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

impl TailEvent {
    pub fn raw(text: impl Into<String>) -> Self {
        TailEvent::Raw { text: text.into() }
    }

    /// Status/summary events are candidates for last-seen deduplication.
    pub fn dedup_key(&self) -> Option<(&'static str, &str)> {
        match self {
            TailEvent::Status { text } => Some(("status", text)),
            TailEvent::Summary { text } => Some(("summary", text)),
            _ => None,
        }
    }
}

impl From<Marker> for TailEvent {
    fn from(marker: Marker) -> Self {
        let text = marker.payload;
        match marker.kind {
            MarkerKind::Status => TailEvent::Status { text },
            MarkerKind::Summary => TailEvent::Summary { text },
            MarkerKind::Task => TailEvent::Task { title: text },
            MarkerKind::TaskDone => TailEvent::TaskDone { title: text },
            kind @ (MarkerKind::Confidence | MarkerKind::Other(_)) => {
                TailEvent::Pulse { kind, text }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::LineSpan;

    fn marker(kind: MarkerKind, payload: &str) -> Marker {
        Marker {
            kind,
            payload: payload.to_string(),
            span: LineSpan::single(0),
        }
    }

    #[test]
    fn test_marker_conversion() {
        assert_eq!(
            TailEvent::from(marker(MarkerKind::Status, "Working")),
            TailEvent::Status {
                text: "Working".to_string()
            }
        );
        assert_eq!(
            TailEvent::from(marker(MarkerKind::TaskDone, "Ship it")),
            TailEvent::TaskDone {
                title: "Ship it".to_string()
            }
        );
        assert_eq!(
            TailEvent::from(marker(MarkerKind::Confidence, "High")),
            TailEvent::Pulse {
                kind: MarkerKind::Confidence,
                text: "High".to_string()
            }
        );
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(TailEvent::Pulse {
            kind: MarkerKind::Other("DEPLOY".to_string()),
            text: "staging".to_string(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "pulse", "kind": "DEPLOY", "text": "staging"})
        );

        let json = serde_json::to_value(TailEvent::raw("hello")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "raw", "text": "hello"}));
    }

    #[test]
    fn test_dedup_key() {
        let status = TailEvent::Status {
            text: "Idle".to_string(),
        };
        assert_eq!(status.dedup_key(), Some(("status", "Idle")));
        assert_eq!(TailEvent::raw("x").dedup_key(), None);
    }
}
