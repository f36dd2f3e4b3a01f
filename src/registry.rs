//! Arena owning every parsed filter. Filters are addressed by [`FilterId`] and deduplicated by
//! text, so parsing the same line twice yields the same id and keeps its hit statistics.

use std::collections::HashMap;

use crate::filters::{Filter, FilterState};
use crate::lists::ParseOptions;

/// Stable handle of a filter inside a [`FilterRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterId(usize);

impl FilterId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Entry {
    filter: Filter,
    state: FilterState,
}

#[derive(Debug, Default)]
pub struct FilterRegistry {
    entries: Vec<Entry>,
    by_text: HashMap<String, FilterId>,
    options: ParseOptions,
}

impl FilterRegistry {
    pub fn new(options: ParseOptions) -> FilterRegistry {
        FilterRegistry {
            entries: Vec::new(),
            by_text: HashMap::new(),
            options,
        }
    }

    /// Returns the filter for `text`, parsing it on first sight. `text` is expected to be
    /// normalized; blank text is not a filter.
    pub fn from_text(&mut self, text: &str) -> Option<FilterId> {
        if text.trim().is_empty() {
            return None;
        }
        if let Some(&id) = self.by_text.get(text) {
            return Some(id);
        }

        let filter = Filter::parse(text, &self.options);
        let id = FilterId(self.entries.len());
        self.entries.push(Entry {
            filter,
            state: FilterState::default(),
        });
        self.by_text.insert(text.to_owned(), id);
        Some(id)
    }

    /// Restores a filter from the key/value pairs of a serialized `[Filter]` block.
    pub fn from_object(&mut self, object: &HashMap<String, String>) -> Option<FilterId> {
        let id = self.from_text(object.get("text")?)?;
        let entry = &mut self.entries[id.0];
        if entry.filter.is_active() {
            if let Some(disabled) = object.get("disabled") {
                entry.state.disabled = disabled == "true";
            }
            if let Some(hit_count) = object.get("hitCount") {
                entry.state.hit_count = hit_count.parse().unwrap_or(0);
            }
            if let Some(last_hit) = object.get("lastHit") {
                entry.state.last_hit = last_hit.parse().unwrap_or(0);
            }
        }
        Some(id)
    }

    pub fn lookup(&self, text: &str) -> Option<FilterId> {
        self.by_text.get(text).copied()
    }

    pub fn get(&self, id: FilterId) -> Option<&Filter> {
        self.entries.get(id.0).map(|e| &e.filter)
    }

    pub fn state(&self, id: FilterId) -> Option<&FilterState> {
        self.entries.get(id.0).map(|e| &e.state)
    }

    pub fn state_mut(&mut self, id: FilterId) -> Option<&mut FilterState> {
        self.entries.get_mut(id.0).map(|e| &mut e.state)
    }

    pub(crate) fn is_disabled(&self, id: FilterId) -> bool {
        self.entries.get(id.0).map_or(true, |e| e.state.disabled)
    }

    /// Counts a match of `id` at `now` (milliseconds since the UNIX epoch).
    pub fn record_hit(&mut self, id: FilterId, now: u64) {
        if let Some(state) = self.state_mut(id) {
            state.hit_count = state.hit_count.saturating_add(1);
            state.last_hit = now;
        }
    }

    pub fn serialize(&self, id: FilterId) -> Vec<String> {
        self.entries
            .get(id.0)
            .map(|e| e.filter.serialize(&e.state))
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterId, &Filter)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (FilterId(i), &e.filter))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../tests/unit/registry.rs"]
mod unit_tests;
