//! Combines a matcher for blocking filters with one for exceptions and settles which of them
//! decides a request.

use std::collections::HashMap;

use crate::filters::network::ContentType;
use crate::filters::Filter;
use crate::matcher::Matcher;
use crate::registry::{FilterId, FilterRegistry};

/// Outcome of checking one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockerResult {
    /// The request should be blocked.
    pub matched: bool,
    /// Blocking filter that matched, whether or not an exception overrode it.
    pub filter: Option<FilterId>,
    /// Exception that matched.
    pub exception: Option<FilterId>,
}

/// url, type mask, document domain, third party, sitekey, specific only
type CacheKey = (String, u32, String, bool, Option<String>, bool);

pub struct Blocker {
    blocking: Matcher,
    whitelist: Matcher,
    result_cache: HashMap<CacheKey, Option<FilterId>>,
    cache_size: usize,
}

impl Blocker {
    pub fn new(cache_size: usize) -> Blocker {
        Blocker {
            blocking: Matcher::new(),
            whitelist: Matcher::new(),
            result_cache: HashMap::new(),
            cache_size,
        }
    }

    /// Routes a URL filter to the matching index. Returns `false` for any other kind of filter.
    pub fn add(&mut self, id: FilterId, filter: &Filter) -> bool {
        let added = match filter {
            Filter::Blocking(f) => {
                self.blocking.add(id, f);
                true
            }
            Filter::Whitelist(f) => {
                self.whitelist.add(id, f);
                true
            }
            _ => false,
        };
        if added {
            self.result_cache.clear();
        }
        added
    }

    pub fn remove(&mut self, id: FilterId) {
        self.blocking.remove(id);
        self.whitelist.remove(id);
        self.result_cache.clear();
    }

    pub fn clear(&mut self) {
        self.blocking.clear();
        self.whitelist.clear();
        self.result_cache.clear();
    }

    /// Drops memoized results, needed whenever a filter's enabled state changes.
    pub fn invalidate_cache(&mut self) {
        self.result_cache.clear();
    }

    pub fn has_filter(&self, id: FilterId) -> bool {
        self.blocking.has_filter(id) || self.whitelist.has_filter(id)
    }

    /// Returns the exception matching the request if there is one, otherwise the first matching
    /// blocking filter. `specific_only` only narrows blocking filters; generic exceptions still
    /// apply.
    #[allow(clippy::too_many_arguments)]
    pub fn matches_any(
        &mut self,
        registry: &FilterRegistry,
        url: &str,
        type_mask: ContentType,
        doc_domain: &str,
        third_party: bool,
        sitekey: Option<&str>,
        specific_only: bool,
    ) -> Option<FilterId> {
        let key = (
            url.to_owned(),
            type_mask.bits(),
            doc_domain.to_owned(),
            third_party,
            sitekey.map(str::to_owned),
            specific_only,
        );
        if let Some(&cached) = self.result_cache.get(&key) {
            return cached;
        }

        let result = self
            .whitelist
            .matches_any(
                registry,
                url,
                type_mask,
                doc_domain,
                third_party,
                sitekey,
                false,
            )
            .or_else(|| {
                self.blocking.matches_any(
                    registry,
                    url,
                    type_mask,
                    doc_domain,
                    third_party,
                    sitekey,
                    specific_only,
                )
            });

        if self.cache_size > 0 {
            if self.result_cache.len() >= self.cache_size {
                self.result_cache.clear();
            }
            self.result_cache.insert(key, result);
        }
        result
    }

    /// Exception matching the request, ignoring blocking filters. Results are not memoized.
    #[allow(clippy::too_many_arguments)]
    pub fn matches_exception(
        &self,
        registry: &FilterRegistry,
        url: &str,
        type_mask: ContentType,
        doc_domain: &str,
        third_party: bool,
        sitekey: Option<&str>,
    ) -> Option<FilterId> {
        self.whitelist.matches_any(
            registry,
            url,
            type_mask,
            doc_domain,
            third_party,
            sitekey,
            false,
        )
    }

    /// Full verdict for a request: both the blocking filter and the exception are reported.
    #[allow(clippy::too_many_arguments)]
    pub fn check(
        &self,
        registry: &FilterRegistry,
        url: &str,
        type_mask: ContentType,
        doc_domain: &str,
        third_party: bool,
        sitekey: Option<&str>,
        specific_only: bool,
    ) -> BlockerResult {
        let filter = self.blocking.matches_any(
            registry,
            url,
            type_mask,
            doc_domain,
            third_party,
            sitekey,
            specific_only,
        );
        let exception = filter.and_then(|_| {
            self.whitelist.matches_any(
                registry,
                url,
                type_mask,
                doc_domain,
                third_party,
                sitekey,
                false,
            )
        });

        BlockerResult {
            matched: filter.is_some() && exception.is_none(),
            filter,
            exception,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/blocker.rs"]
mod unit_tests;
