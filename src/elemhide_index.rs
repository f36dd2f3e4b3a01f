//! Element hiding filters indexed by the domains they are restricted to.

use std::collections::{BTreeMap, HashMap};

use rand::Rng;

use crate::filters::domains::normalize_domain;
use crate::filters::elemhide::ElemHideFilter;
use crate::registry::{FilterId, FilterRegistry};

/// Random keys tried before falling back to sequential ones.
const KEY_ATTEMPTS: usize = 16;

#[derive(Debug)]
struct IndexedFilter {
    seq: u64,
    key: String,
    include_domains: Vec<String>,
}

/// Buckets are ordered by insertion sequence so results come out in the order filters were
/// added.
#[derive(Debug, Default)]
pub struct ElemHideIndex {
    filters: HashMap<FilterId, IndexedFilter>,
    by_domain: HashMap<String, BTreeMap<u64, FilterId>>,
    generic: BTreeMap<u64, FilterId>,
    filter_by_key: HashMap<String, FilterId>,
    next_seq: u64,
    fallback_keys: u64,
}

impl ElemHideIndex {
    pub fn new() -> ElemHideIndex {
        ElemHideIndex::default()
    }

    /// Indexes `filter` and hands it a key unique among indexed filters. Adding an id twice has
    /// no effect.
    pub fn add(&mut self, id: FilterId, filter: &ElemHideFilter) {
        if self.filters.contains_key(&id) {
            return;
        }

        let seq = self.next_seq;
        self.next_seq += 1;

        let include_domains: Vec<String> = filter
            .domains
            .as_ref()
            .map(|d| d.include_domains().map(str::to_owned).collect())
            .unwrap_or_default();

        if include_domains.is_empty() {
            self.generic.insert(seq, id);
        } else {
            for domain in &include_domains {
                self.by_domain
                    .entry(domain.clone())
                    .or_default()
                    .insert(seq, id);
            }
        }

        let key = self.generate_key();
        self.filter_by_key.insert(key.clone(), id);
        self.filters.insert(
            id,
            IndexedFilter {
                seq,
                key,
                include_domains,
            },
        );
    }

    /// Unknown ids are ignored.
    pub fn remove(&mut self, id: FilterId) {
        let indexed = match self.filters.remove(&id) {
            Some(indexed) => indexed,
            None => return,
        };

        self.filter_by_key.remove(&indexed.key);
        if indexed.include_domains.is_empty() {
            self.generic.remove(&indexed.seq);
        }
        for domain in &indexed.include_domains {
            if let Some(bucket) = self.by_domain.get_mut(domain) {
                bucket.remove(&indexed.seq);
                if bucket.is_empty() {
                    self.by_domain.remove(domain);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.filters.clear();
        self.by_domain.clear();
        self.generic.clear();
        self.filter_by_key.clear();
    }

    pub fn has_filter(&self, id: FilterId) -> bool {
        self.filters.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn key_for(&self, id: FilterId) -> Option<&str> {
        self.filters.get(&id).map(|f| f.key.as_str())
    }

    pub fn filter_by_key(&self, key: &str) -> Option<FilterId> {
        self.filter_by_key.get(key).copied()
    }

    /// Selectors of enabled filters active on `domain`, in insertion order. With `specific_only`
    /// set, filters applying on every site are left out.
    pub fn selectors_for_domain(
        &self,
        registry: &FilterRegistry,
        domain: &str,
        specific_only: bool,
    ) -> Vec<String> {
        let domain = normalize_domain(domain).unwrap_or_default();
        let mut candidates: Vec<(u64, FilterId)> = Vec::new();

        if !specific_only {
            candidates.extend(self.generic.iter().map(|(&seq, &id)| (seq, id)));
        }

        let mut current = domain.as_str();
        while !current.is_empty() {
            if let Some(bucket) = self.by_domain.get(current) {
                candidates.extend(bucket.iter().map(|(&seq, &id)| (seq, id)));
            }
            current = match current.find('.') {
                Some(pos) => &current[pos + 1..],
                None => break,
            };
        }

        candidates.sort_unstable_by_key(|&(seq, _)| seq);
        candidates.dedup_by_key(|&mut (seq, _)| seq);

        candidates
            .into_iter()
            .filter(|&(_, id)| !registry.is_disabled(id))
            .filter_map(|(_, id)| registry.get(id).and_then(|f| f.as_elemhide()))
            .filter(|filter| filter.is_active_on_normalized(&domain))
            .map(|filter| filter.selector.clone())
            .collect()
    }

    fn generate_key(&mut self) -> String {
        let mut rng = rand::thread_rng();
        for _ in 0..KEY_ATTEMPTS {
            let key = format!("{:012}", rng.gen_range(0..1_000_000_000_000u64));
            if !self.filter_by_key.contains_key(&key) {
                return key;
            }
        }

        log::debug!("random element hiding keys exhausted, using sequential keys");
        loop {
            self.fallback_keys += 1;
            let key = format!("seq{}", self.fallback_keys);
            if !self.filter_by_key.contains_key(&key) {
                return key;
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/elemhide_index.rs"]
mod unit_tests;
