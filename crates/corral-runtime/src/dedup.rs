//! Suppression of repeated STATUS and SUMMARY values.
//!
//! Agents re-print their status line on every redraw; only a change is
//! news. Other events always pass.

use corral_types::TailEvent;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct LastSeen {
    values: HashMap<String, HashMap<&'static str, String>>,
}

impl LastSeen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `event` for agent `key`; false if it repeats the last value.
    pub fn observe(&mut self, key: &str, event: &TailEvent) -> bool {
        let Some((kind, value)) = event.dedup_key() else {
            return true;
        };
        let seen = self.values.entry(key.to_string()).or_default();
        if seen.get(kind).is_some_and(|last| last == value) {
            return false;
        }
        seen.insert(kind, value.to_string());
        true
    }

    pub fn filter(&mut self, key: &str, events: Vec<TailEvent>) -> Vec<TailEvent> {
        events
            .into_iter()
            .filter(|event| self.observe(key, event))
            .collect()
    }

    pub fn forget(&mut self, key: &str) {
        self.values.remove(key);
    }
}
