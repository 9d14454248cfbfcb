use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of an embedded `||TYPE payload||` marker.
///
/// Serialized as the uppercase wire tag (`"STATUS"`, `"TASK_DONE"`, ...), so
/// free-form `PULSE:<TYPE>` events round-trip through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarkerKind {
    Status,
    Summary,
    Confidence,
    Task,
    TaskDone,
    Other(String),
}

impl MarkerKind {
    /// Map a wire tag to a kind. Tags are case-sensitive on the wire; unknown
    /// tags become `Other`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "STATUS" => MarkerKind::Status,
            "SUMMARY" => MarkerKind::Summary,
            "CONFIDENCE" => MarkerKind::Confidence,
            "TASK" => MarkerKind::Task,
            "TASK_DONE" => MarkerKind::TaskDone,
            other => MarkerKind::Other(other.to_string()),
        }
    }

    pub fn as_tag(&self) -> &str {
        match self {
            MarkerKind::Status => "STATUS",
            MarkerKind::Summary => "SUMMARY",
            MarkerKind::Confidence => "CONFIDENCE",
            MarkerKind::Task => "TASK",
            MarkerKind::TaskDone => "TASK_DONE",
            MarkerKind::Other(tag) => tag,
        }
    }

    /// Whether the bare (non `PULSE:`) form is accepted for this kind.
    pub fn accepts_bare_form(&self) -> bool {
        matches!(
            self,
            MarkerKind::Status | MarkerKind::Summary | MarkerKind::Task | MarkerKind::TaskDone
        )
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl From<String> for MarkerKind {
    fn from(tag: String) -> Self {
        MarkerKind::from_tag(&tag)
    }
}

impl From<MarkerKind> for String {
    fn from(kind: MarkerKind) -> Self {
        kind.as_tag().to_string()
    }
}

/// Inclusive range of physical line numbers a logical line was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSpan {
    pub first: usize,
    pub last: usize,
}

impl LineSpan {
    pub fn single(line: usize) -> Self {
        Self {
            first: line,
            last: line,
        }
    }

    pub fn line_count(&self) -> usize {
        self.last - self.first + 1
    }
}

/// A marker recovered from terminal output. The payload is always
/// whitespace-collapsed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub payload: String,
    pub span: LineSpan,
}

/// A display line after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub text: String,
    pub is_noise: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_kind_tags() {
        assert_eq!(MarkerKind::from_tag("TASK_DONE"), MarkerKind::TaskDone);
        assert_eq!(
            MarkerKind::from_tag("DEPLOY"),
            MarkerKind::Other("DEPLOY".to_string())
        );
        assert_eq!(MarkerKind::Confidence.to_string(), "CONFIDENCE");
        assert!(!MarkerKind::Confidence.accepts_bare_form());
        assert!(MarkerKind::Status.accepts_bare_form());
    }

    #[test]
    fn test_marker_kind_serializes_as_tag() {
        let json = serde_json::to_string(&MarkerKind::Other("DEPLOY".to_string())).unwrap();
        assert_eq!(json, "\"DEPLOY\"");

        let kind: MarkerKind = serde_json::from_str("\"SUMMARY\"").unwrap();
        assert_eq!(kind, MarkerKind::Summary);
    }

    #[test]
    fn test_line_span_len() {
        assert_eq!(LineSpan::single(4).line_count(), 1);
        assert_eq!(LineSpan { first: 2, last: 5 }.line_count(), 4);
    }
}
