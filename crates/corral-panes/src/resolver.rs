//! Map a logical agent to the pane that currently hosts it.
//!
//! Resolution is an ordered list of rules; the first rule that matches any
//! pane wins, and within a rule the first pane in listing order wins.

use corral_types::PaneRecord;

use crate::mux::{Multiplexer, list_panes};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaneQuery {
    pub name: String,
    pub agent_type: Option<String>,
    pub session_id: Option<String>,
}

impl PaneQuery {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, agent_type: impl Into<String>) -> Self {
        self.agent_type = Some(agent_type.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Which rule produced a match, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    /// Session name contains the session id
    SessionId,
    /// Name matches and the pane mentions the agent type
    NameAndType,
    /// Name matches
    Name,
}

struct MatchRule {
    tier: MatchTier,
    eligible: fn(&PaneQuery) -> bool,
    matches: fn(&PaneQuery, &PaneRecord) -> bool,
}

// A session id is authoritative: when one is given, name rules never run.
const RULES: &[MatchRule] = &[
    MatchRule {
        tier: MatchTier::SessionId,
        eligible: has_session_id,
        matches: session_id_matches,
    },
    MatchRule {
        tier: MatchTier::NameAndType,
        eligible: fuzzy_with_type,
        matches: name_and_type_match,
    },
    MatchRule {
        tier: MatchTier::Name,
        eligible: fuzzy,
        matches: name_matches,
    },
];

fn has_session_id(query: &PaneQuery) -> bool {
    query.session_id.as_deref().is_some_and(|id| !id.is_empty())
}

fn fuzzy(query: &PaneQuery) -> bool {
    !has_session_id(query) && !query.name.is_empty()
}

fn fuzzy_with_type(query: &PaneQuery) -> bool {
    fuzzy(query) && query.agent_type.as_deref().is_some_and(|t| !t.is_empty())
}

fn session_id_matches(query: &PaneQuery, pane: &PaneRecord) -> bool {
    query
        .session_id
        .as_deref()
        .is_some_and(|id| pane.session_name.contains(id))
}

fn name_matches(query: &PaneQuery, pane: &PaneRecord) -> bool {
    let name = query.name.to_lowercase();
    let normalized = name.replace('_', "-");
    let title = pane.title.to_lowercase();
    let session = pane.session_name.to_lowercase();
    let folder = pane.folder_name().to_lowercase();

    [name.as_str(), normalized.as_str()]
        .iter()
        .any(|candidate| {
            title.contains(candidate) || session.contains(candidate) || folder == *candidate
        })
}

fn name_and_type_match(query: &PaneQuery, pane: &PaneRecord) -> bool {
    let Some(agent_type) = query.agent_type.as_deref() else {
        return false;
    };
    let agent_type = agent_type.to_lowercase();
    name_matches(query, pane)
        && (pane.title.to_lowercase().contains(&agent_type)
            || pane.session_name.to_lowercase().contains(&agent_type))
}

/// Best pane for `query` and the rule that selected it.
pub fn resolve_pane_tier<'a>(
    panes: &'a [PaneRecord],
    query: &PaneQuery,
) -> Option<(MatchTier, &'a PaneRecord)> {
    RULES
        .iter()
        .filter(|rule| (rule.eligible)(query))
        .find_map(|rule| {
            panes
                .iter()
                .find(|pane| (rule.matches)(query, pane))
                .map(|pane| (rule.tier, pane))
        })
}

pub fn resolve_pane<'a>(panes: &'a [PaneRecord], query: &PaneQuery) -> Option<&'a PaneRecord> {
    resolve_pane_tier(panes, query).map(|(_, pane)| pane)
}

/// List live panes and resolve `query` against them. A failed pane query
/// resolves to nothing.
pub async fn find_pane(mux: &dyn Multiplexer, query: &PaneQuery) -> Option<PaneRecord> {
    let panes = match list_panes(mux).await {
        Ok(panes) => panes,
        Err(err) => {
            tracing::warn!(error = %err, "listing panes failed");
            return None;
        }
    };
    resolve_pane(&panes, query).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn pane(title: &str, session: &str, dir: &str) -> PaneRecord {
        PaneRecord {
            title: title.to_string(),
            session_name: session.to_string(),
            target: format!("{}:0.0", session),
            working_directory: PathBuf::from(dir),
        }
    }

    #[test]
    fn test_session_id_tier() {
        let panes = vec![
            pane("my-agent", "main", "/work/my-agent"),
            pane("claude", "claude-abc123de-0000-4000-8000-00000000beef", "/work/other"),
        ];
        let query = PaneQuery::named("my-agent").with_session_id("abc123de-0000-4000-8000-00000000beef");

        let (tier, found) = resolve_pane_tier(&panes, &query).unwrap();
        assert_eq!(tier, MatchTier::SessionId);
        assert_eq!(found.session_name, "claude-abc123de-0000-4000-8000-00000000beef");
    }

    #[test]
    fn test_unknown_session_id_does_not_fall_back() {
        let panes = vec![pane("my-agent", "main", "/work/my-agent")];
        let query = PaneQuery::named("my-agent").with_session_id("deadbeef");
        assert_eq!(resolve_pane(&panes, &query), None);
    }

    #[test]
    fn test_normalized_name_matches_folder() {
        let panes = vec![
            pane("zsh", "main", "/home/dev"),
            pane("", "work", "/src/my-agent"),
        ];
        let (tier, found) = resolve_pane_tier(&panes, &PaneQuery::named("my_agent")).unwrap();
        assert_eq!(tier, MatchTier::Name);
        assert_eq!(found.session_name, "work");
    }

    #[test]
    fn test_case_insensitive_title_match() {
        let panes = vec![pane("API — Claude", "s1", "/x")];
        assert!(resolve_pane(&panes, &PaneQuery::named("api")).is_some());
    }

    #[test]
    fn test_type_breaks_ties() {
        let panes = vec![
            pane("api — gemini", "g", "/work/api"),
            pane("api — claude", "c", "/work/api"),
        ];

        let query = PaneQuery::named("api").with_type("claude");
        let (tier, found) = resolve_pane_tier(&panes, &query).unwrap();
        assert_eq!(tier, MatchTier::NameAndType);
        assert_eq!(found.session_name, "c");

        let query = PaneQuery::named("api").with_type("codex");
        let (tier, found) = resolve_pane_tier(&panes, &query).unwrap();
        assert_eq!(tier, MatchTier::Name);
        assert_eq!(found.session_name, "g");
    }

    #[test]
    fn test_prefix_collision_first_match_wins() {
        let panes = vec![
            pane("api-v2 — claude", "c2", "/work/api-v2"),
            pane("api — claude", "c1", "/work/api"),
        ];
        let found = resolve_pane(&panes, &PaneQuery::named("api").with_type("claude")).unwrap();
        assert_eq!(found.session_name, "c2");
    }

    #[test]
    fn test_empty_name_matches_nothing() {
        let panes = vec![pane("anything", "s", "/")];
        assert_eq!(resolve_pane(&panes, &PaneQuery::named("")), None);
    }
}
