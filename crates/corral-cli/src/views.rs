//! Plain-text rendering. Color is applied only when stdout is a terminal.

use corral_panes::MatchTier;
use corral_runtime::RegistryEvent;
use corral_types::{LogSnapshot, PaneRecord, SessionEpoch, TailEvent};
use owo_colors::OwoColorize;

fn paint(text: &str, color: bool, style: fn(&str) -> String) -> String {
    if color { style(text) } else { text.to_string() }
}

fn bold(text: &str) -> String {
    text.bold().to_string()
}

fn dim(text: &str) -> String {
    text.bright_black().to_string()
}

fn green(text: &str) -> String {
    text.green().to_string()
}

fn yellow(text: &str) -> String {
    text.yellow().to_string()
}

fn red(text: &str) -> String {
    text.red().to_string()
}

fn cyan(text: &str) -> String {
    text.cyan().to_string()
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

pub fn event_line(event: &TailEvent, color: bool) -> String {
    let (label, text, style): (String, String, fn(&str) -> String) = match event {
        TailEvent::Raw { text } => return text.clone(),
        TailEvent::Status { text } => ("STATUS".into(), text.clone(), green),
        TailEvent::Summary { text } => ("SUMMARY".into(), text.clone(), cyan),
        TailEvent::Pulse { kind, text } => (kind.as_tag().to_string(), text.clone(), yellow),
        TailEvent::Task { title } => ("TASK".into(), title.clone(), bold),
        TailEvent::TaskDone { title } => ("TASK_DONE".into(), title.clone(), dim),
        TailEvent::User { text } => ("USER".into(), truncate(text, 200), bold),
        TailEvent::Assistant { text } => ("ASSISTANT".into(), truncate(text, 200), cyan),
        TailEvent::ToolUse {
            name,
            input_summary,
            ..
        } => (format!("TOOL {}", name), input_summary.clone(), yellow),
        TailEvent::ToolResult {
            tool_name,
            content,
            is_error,
            ..
        } => {
            let label = match tool_name {
                Some(name) => format!("RESULT {}", name),
                None => "RESULT".to_string(),
            };
            let first = content.lines().next().unwrap_or_default();
            let style: fn(&str) -> String = if *is_error { red } else { dim };
            (label, truncate(first, 120), style)
        }
    };
    format!("{} {}", paint(&format!("[{}]", label), color, style), text)
}

pub fn epoch_line(epoch: &SessionEpoch, color: bool) -> String {
    format!(
        "{}  {}  {}  {}  {}",
        paint(&epoch.identity.name, color, bold),
        epoch.identity.agent_type,
        paint(&epoch.key(), color, cyan),
        epoch.pane.target,
        paint(&epoch.log_path.display().to_string(), color, dim),
    )
}

pub fn pane_line(pane: &PaneRecord, tier: MatchTier, color: bool) -> String {
    let tier = match tier {
        MatchTier::SessionId => "session-id",
        MatchTier::NameAndType => "name+type",
        MatchTier::Name => "name",
    };
    format!(
        "{}  {}  {}  {}",
        paint(&pane.target, color, bold),
        pane.title,
        pane.working_directory.display(),
        paint(&format!("({})", tier), color, dim),
    )
}

pub fn snapshot_text(snapshot: &LogSnapshot, color: bool) -> String {
    let mut out = Vec::new();
    let none = || "-".to_string();
    out.push(format!(
        "{} {}",
        paint("status: ", color, bold),
        snapshot.status.clone().unwrap_or_else(none)
    ));
    out.push(format!(
        "{} {}",
        paint("summary:", color, bold),
        snapshot.summary.clone().unwrap_or_else(none)
    ));
    out.push(format!(
        "{} {}",
        paint("idle:   ", color, bold),
        snapshot
            .staleness_seconds
            .map(|secs| format!("{:.0}s", secs))
            .unwrap_or_else(none)
    ));
    if !snapshot.recent_lines.is_empty() {
        out.push(String::new());
        out.extend(snapshot.recent_lines.iter().cloned());
    }
    out.join("\n")
}

pub fn registry_line(event: &RegistryEvent, color: bool) -> String {
    match event {
        RegistryEvent::AgentAdded { epoch } => {
            format!("{} {}", paint("+", color, green), epoch_line(epoch, color))
        }
        RegistryEvent::AgentRemoved { key } => format!("{} {}", paint("-", color, red), key),
        RegistryEvent::AgentMoved { key, pane, .. } => {
            format!("{} {} -> {}", paint("~", color, yellow), key, pane.target)
        }
        RegistryEvent::Snapshot { key, snapshot } => format!(
            "{} {} {}",
            paint("=", color, dim),
            key,
            snapshot.status.as_deref().unwrap_or("-")
        ),
        RegistryEvent::Telemetry { key, event } => {
            format!("{} {}", paint(key, color, dim), event_line(event, color))
        }
        RegistryEvent::Restarted { old_key, epoch } => format!(
            "{} {} -> {}",
            paint("*", color, yellow),
            old_key,
            epoch_line(epoch, color)
        ),
    }
}
