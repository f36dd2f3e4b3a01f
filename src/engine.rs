//! The main entry point: owns the filter registry together with the URL and element hiding
//! indexes, and keeps them in sync as filters are added, removed, enabled or disabled.

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::blocker::{Blocker, BlockerResult};
use crate::elemhide_index::ElemHideIndex;
use crate::filters::network::ContentType;
use crate::filters::{Filter, FilterState};
use crate::lists::{self, ParseOptions};
use crate::registry::{FilterId, FilterRegistry};
use crate::request::Request;

/// Number of query results the blocker memoizes by default.
pub const DEFAULT_RESULT_CACHE_SIZE: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineOptions {
    #[serde(default)]
    pub parse_options: ParseOptions,
    #[serde(default = "default_result_cache_size")]
    pub result_cache_size: usize,
}

fn default_result_cache_size() -> usize {
    DEFAULT_RESULT_CACHE_SIZE
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            parse_options: ParseOptions::default(),
            result_cache_size: DEFAULT_RESULT_CACHE_SIZE,
        }
    }
}

/// Filter engine holding every known filter and the indexes of the listed ones.
///
/// Queries that count hits take `&mut self`; hosts sharing an engine between threads should wrap
/// it in a lock.
pub struct Engine {
    registry: FilterRegistry,
    blocker: Blocker,
    elemhide: ElemHideIndex,
    /// Filters added by the host, whether or not they are currently enabled.
    listed: HashSet<FilterId>,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(EngineOptions::default())
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl Engine {
    pub fn new(options: EngineOptions) -> Engine {
        Engine {
            registry: FilterRegistry::new(options.parse_options),
            blocker: Blocker::new(options.result_cache_size),
            elemhide: ElemHideIndex::new(),
            listed: HashSet::new(),
        }
    }

    /// Builds an engine from raw filter lines.
    pub fn from_rules(rules: &[String]) -> Engine {
        let mut engine = Engine::default();
        for rule in rules {
            if let Some(id) = engine.filter_from_text(rule) {
                engine.add_filter(id);
            }
        }
        engine
    }

    /// Normalizes and parses one raw line. Blank lines and list headers are not filters.
    pub fn filter_from_text(&mut self, raw: &str) -> Option<FilterId> {
        if lists::is_header(raw) {
            return None;
        }
        self.register(&lists::normalize_filter(raw))
    }

    fn register(&mut self, text: &str) -> Option<FilterId> {
        let id = self.registry.from_text(text)?;
        if let Some(Filter::Invalid(invalid)) = self.registry.get(id) {
            log::debug!(
                "invalid filter {:?}: {}",
                invalid.text,
                invalid.reason.reason()
            );
        }
        Some(id)
    }

    /// Parses a whole list and adds its filters, returning their ids in list order.
    pub fn add_filter_list(&mut self, text: &str) -> Vec<FilterId> {
        let list = lists::parse_filter_list(text);
        let mut ids = Vec::with_capacity(list.filters.len());
        for line in &list.filters {
            if let Some(id) = self.register(line) {
                self.add_filter(id);
                ids.push(id);
            }
        }
        ids
    }

    /// Lists `id` and indexes it if it is an enabled blocking, exception or element hiding
    /// filter. Other filters are kept listed but never indexed.
    pub fn add_filter(&mut self, id: FilterId) {
        self.listed.insert(id);
        self.index(id);
    }

    /// Unlists `id`. Removing a filter that was never added is a no-op.
    pub fn remove_filter(&mut self, id: FilterId) {
        self.listed.remove(&id);
        self.unindex(id);
    }

    /// Unlists everything. Filter state in the registry is kept.
    pub fn clear(&mut self) {
        self.listed.clear();
        self.blocker.clear();
        self.elemhide.clear();
    }

    pub fn set_disabled(&mut self, id: FilterId, disabled: bool) {
        match self.registry.state_mut(id) {
            Some(state) if state.disabled != disabled => state.disabled = disabled,
            _ => return,
        }
        if disabled {
            self.unindex(id);
        } else if self.listed.contains(&id) {
            self.index(id);
        }
        self.blocker.invalidate_cache();
    }

    fn index(&mut self, id: FilterId) {
        if self.registry.is_disabled(id) {
            log::trace!("not indexing disabled filter {:?}", id);
            return;
        }
        match self.registry.get(id) {
            Some(Filter::ElemHide(filter)) => self.elemhide.add(id, filter),
            Some(filter) => {
                if !self.blocker.add(id, filter) {
                    log::trace!("filter {:?} has nothing to index", filter.text());
                }
            }
            None => (),
        }
    }

    fn unindex(&mut self, id: FilterId) {
        self.blocker.remove(id);
        self.elemhide.remove(id);
    }

    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    pub fn filter(&self, id: FilterId) -> Option<&Filter> {
        self.registry.get(id)
    }

    pub fn filter_state(&self, id: FilterId) -> Option<&FilterState> {
        self.registry.state(id)
    }

    pub fn is_listed(&self, id: FilterId) -> bool {
        self.listed.contains(&id)
    }

    /// Whether `id` currently takes part in matching.
    pub fn is_indexed(&self, id: FilterId) -> bool {
        self.blocker.has_filter(id) || self.elemhide.has_filter(id)
    }

    /// Exception or blocking filter deciding the request, counted as a hit.
    #[allow(clippy::too_many_arguments)]
    pub fn matches_any(
        &mut self,
        url: &str,
        type_mask: ContentType,
        doc_domain: &str,
        third_party: bool,
        sitekey: Option<&str>,
        specific_only: bool,
    ) -> Option<FilterId> {
        let result = self.blocker.matches_any(
            &self.registry,
            url,
            type_mask,
            doc_domain,
            third_party,
            sitekey,
            specific_only,
        );
        if let Some(id) = result {
            self.registry.record_hit(id, now_millis());
        }
        result
    }

    /// Exception matching the page at `url` for one of the page-level types, counted as a hit.
    fn page_exception(
        &mut self,
        url: &str,
        type_mask: ContentType,
        doc_domain: &str,
        sitekey: Option<&str>,
    ) -> Option<FilterId> {
        if url.is_empty() {
            return None;
        }
        let id = self.blocker.matches_exception(
            &self.registry,
            url,
            type_mask,
            doc_domain,
            false,
            sitekey,
        )?;
        self.registry.record_hit(id, now_millis());
        Some(id)
    }

    /// Decides a request, honoring `$document` and `$genericblock` exceptions on the page that
    /// issued it.
    pub fn check_network_request(&mut self, request: &Request) -> BlockerResult {
        let sitekey = request.sitekey.as_deref();
        let source_url = request.source_url.as_str();
        let source_hostname = request.source_hostname.as_str();

        if let Some(exception) =
            self.page_exception(source_url, ContentType::DOCUMENT, source_hostname, sitekey)
        {
            return BlockerResult {
                matched: false,
                filter: None,
                exception: Some(exception),
            };
        }
        let specific_only = self
            .page_exception(source_url, ContentType::GENERICBLOCK, source_hostname, sitekey)
            .is_some();

        let result = self.blocker.check(
            &self.registry,
            &request.url,
            request.content_type,
            &request.source_hostname,
            request.is_third_party,
            sitekey,
            specific_only,
        );
        let now = now_millis();
        if let Some(id) = result.exception.or(result.filter) {
            self.registry.record_hit(id, now);
        }
        result
    }

    /// Selectors of element hiding filters active on `domain`, in the order they were added.
    pub fn selectors_for_domain(&self, domain: &str, specific_only: bool) -> Vec<String> {
        self.elemhide
            .selectors_for_domain(&self.registry, domain, specific_only)
    }

    /// Selectors to hide on the page at `doc_url`, honoring `$elemhide` and `$generichide`
    /// exceptions.
    pub fn hidden_selectors(&mut self, doc_url: &str, doc_domain: &str) -> Vec<String> {
        if self
            .page_exception(doc_url, ContentType::ELEMHIDE, doc_domain, None)
            .is_some()
        {
            return vec![];
        }
        let specific_only = self
            .page_exception(doc_url, ContentType::GENERICHIDE, doc_domain, None)
            .is_some();
        self.selectors_for_domain(doc_domain, specific_only)
    }

    pub fn elemhide_key(&self, id: FilterId) -> Option<&str> {
        self.elemhide.key_for(id)
    }

    /// Counts a hit reported for the element hiding filter behind `key`.
    pub fn record_elemhide_hit(&mut self, key: &str) -> Option<FilterId> {
        let id = self.elemhide.filter_by_key(key)?;
        self.registry.record_hit(id, now_millis());
        Some(id)
    }

    /// `[Filter]` blocks for every filter whose state differs from the default.
    pub fn serialize_filters(&self) -> Vec<String> {
        self.registry
            .iter()
            .flat_map(|(id, _)| self.registry.serialize(id))
            .collect()
    }

    /// Restores filter state written by [`Engine::serialize_filters`]. Listed filters are
    /// re-indexed to reflect a restored disabled flag. Returns the restored ids.
    pub fn restore_filters(&mut self, serialized: &str) -> Vec<FilterId> {
        let ids: Vec<FilterId> = lists::parse_serialized_filters(serialized)
            .iter()
            .filter_map(|block| self.registry.from_object(block))
            .collect();

        for &id in &ids {
            if self.listed.contains(&id) {
                if self.registry.is_disabled(id) {
                    self.unindex(id);
                } else {
                    self.index(id);
                }
            }
        }
        self.blocker.invalidate_cache();
        ids
    }
}

#[cfg(test)]
#[path = "../tests/unit/engine.rs"]
mod unit_tests;
