//! Keyword index over URL filters.
//!
//! Each filter is stored in the bucket of one keyword that any URL it matches must contain as a
//! whole token. A query only visits the buckets of the tokens found in the URL plus the catch-all
//! bucket of filters that had no usable keyword.

use std::collections::HashMap;

use crate::filters::domains::normalize_domain;
use crate::filters::network::{ContentType, RegExpFilter};
use crate::registry::{FilterId, FilterRegistry};
use crate::utils::{self, fast_hash, Hash};

/// Bucket checked for every URL.
const CATCH_ALL: Hash = 0;

/// Tokens too common in URLs to narrow anything down; only used when nothing else is available.
const BAD_KEYWORDS: [&str; 6] = ["http", "https", "www", "com", "html", "js"];

#[derive(Debug, Default)]
pub struct Matcher {
    filter_by_keyword: HashMap<Hash, Vec<FilterId>>,
    keyword_by_filter: HashMap<FilterId, Hash>,
}

impl Matcher {
    pub fn new() -> Matcher {
        Matcher::default()
    }

    /// Indexes `filter` under `id`. Adding an id twice has no effect.
    pub fn add(&mut self, id: FilterId, filter: &RegExpFilter) {
        if self.keyword_by_filter.contains_key(&id) {
            return;
        }
        let keyword = self.find_keyword(filter);
        self.filter_by_keyword.entry(keyword).or_default().push(id);
        self.keyword_by_filter.insert(id, keyword);
    }

    /// Unknown ids are ignored.
    pub fn remove(&mut self, id: FilterId) {
        let keyword = match self.keyword_by_filter.remove(&id) {
            Some(keyword) => keyword,
            None => return,
        };
        if let Some(bucket) = self.filter_by_keyword.get_mut(&keyword) {
            if let Some(pos) = bucket.iter().position(|&f| f == id) {
                bucket.remove(pos);
            }
            if bucket.is_empty() {
                self.filter_by_keyword.remove(&keyword);
            }
        }
    }

    pub fn clear(&mut self) {
        self.filter_by_keyword.clear();
        self.keyword_by_filter.clear();
    }

    pub fn has_filter(&self, id: FilterId) -> bool {
        self.keyword_by_filter.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.keyword_by_filter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyword_by_filter.is_empty()
    }

    /// Picks the candidate keyword with the smallest bucket, preferring longer ones on ties.
    pub fn find_keyword(&self, filter: &RegExpFilter) -> Hash {
        let mut best: Option<(bool, usize, usize, Hash)> = None;

        for candidate in filter.keyword_candidates() {
            let hash = fast_hash(&candidate);
            let bad = BAD_KEYWORDS.contains(&candidate.as_str());
            let count = self.filter_by_keyword.get(&hash).map_or(0, Vec::len);
            let better = match best {
                None => true,
                Some((best_bad, best_count, best_len, _)) => {
                    (bad, count, std::cmp::Reverse(candidate.len()))
                        < (best_bad, best_count, std::cmp::Reverse(best_len))
                }
            };
            if better {
                best = Some((bad, count, candidate.len(), hash));
            }
        }

        best.map_or(CATCH_ALL, |(_, _, _, hash)| hash)
    }

    /// First enabled filter matching the request, if any.
    #[allow(clippy::too_many_arguments)]
    pub fn matches_any(
        &self,
        registry: &FilterRegistry,
        url: &str,
        type_mask: ContentType,
        doc_domain: &str,
        third_party: bool,
        sitekey: Option<&str>,
        specific_only: bool,
    ) -> Option<FilterId> {
        if self.keyword_by_filter.is_empty() {
            return None;
        }

        let doc_domain = normalize_domain(doc_domain).unwrap_or_default();
        let mut tokens = utils::tokenize(&url.to_ascii_lowercase());
        tokens.sort_unstable();
        tokens.dedup();
        if !tokens.contains(&CATCH_ALL) {
            tokens.push(CATCH_ALL);
        }

        tokens
            .iter()
            .filter_map(|token| self.filter_by_keyword.get(token))
            .flatten()
            .copied()
            .find(|&id| {
                if registry.is_disabled(id) {
                    return false;
                }
                match registry.get(id).and_then(|f| f.as_regexp()) {
                    Some(filter) => {
                        !(specific_only && filter.is_generic())
                            && filter.matches_normalized(
                                url,
                                type_mask,
                                &doc_domain,
                                third_party,
                                sitekey,
                            )
                    }
                    None => false,
                }
            })
    }
}

#[cfg(test)]
#[path = "../tests/unit/matcher.rs"]
mod unit_tests;
