use serde::{Deserialize, Serialize};

/// Point-in-time view of an agent log. `Default` is the zero-value snapshot
/// returned when the file cannot be read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogSnapshot {
    pub status: Option<String>,
    pub summary: Option<String>,
    /// Oldest first
    pub recent_lines: Vec<String>,
    pub staleness_seconds: Option<f64>,
}

impl LogSnapshot {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.summary.is_none()
            && self.recent_lines.is_empty()
            && self.staleness_seconds.is_none()
    }
}
