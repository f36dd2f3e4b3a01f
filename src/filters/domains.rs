//! Domain restrictions attached to URL filters (`$domain=a.com|~b.com`) and element hiding filters
//! (`a.com,~b.com##.ad`).

use std::collections::HashMap;

use crate::filters::FilterError;

/// Brings a domain to the form restrictions are stored in: trailing dots removed, internationalized
/// labels converted to punycode, uppercased.
pub fn normalize_domain(domain: &str) -> Result<String, FilterError> {
    let trimmed = domain.trim_end_matches('.');
    if trimmed.is_ascii() {
        Ok(trimmed.to_ascii_uppercase())
    } else {
        idna::domain_to_ascii(trimmed)
            .map(|ascii| ascii.to_ascii_uppercase())
            .map_err(|_| FilterError::InvalidDomain(domain.to_owned()))
    }
}

/// Included and excluded domains of a single filter.
///
/// Each normalized domain maps to `true` when the filter applies there and `false` when it is
/// explicitly excluded. A domain listed both ways keeps whichever entry came last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSet {
    entries: HashMap<String, bool>,
    has_includes: bool,
}

impl DomainSet {
    /// Parses a `separator`-delimited list where `~` marks exclusions. Empty entries are skipped;
    /// `Ok(None)` means nothing usable was listed.
    pub fn parse(source: &str, separator: char) -> Result<Option<DomainSet>, FilterError> {
        let mut entries = HashMap::new();

        for raw in source.split(separator) {
            let (include, domain) = match raw.strip_prefix('~') {
                Some(domain) => (false, domain),
                None => (true, raw),
            };
            let domain = normalize_domain(domain)?;
            if domain.is_empty() {
                continue;
            }
            entries.insert(domain, include);
        }

        if entries.is_empty() {
            return Ok(None);
        }

        let has_includes = entries.values().any(|&include| include);
        Ok(Some(DomainSet {
            entries,
            has_includes,
        }))
    }

    /// Whether the filter is limited to a set of domains rather than applying everywhere.
    pub fn has_includes(&self) -> bool {
        self.has_includes
    }

    pub fn include_domains(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, &include)| include)
            .map(|(domain, _)| domain.as_str())
    }

    pub fn exclude_domains(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, &include)| !include)
            .map(|(domain, _)| domain.as_str())
    }

    pub fn is_active_on_domain(&self, doc_domain: &str) -> bool {
        match normalize_domain(doc_domain) {
            Ok(domain) => self.is_active_on_normalized(&domain),
            Err(_) => !self.has_includes,
        }
    }

    /// Walks from the full domain towards the root; the first listed suffix decides. With no hit
    /// the filter applies only if it has no include list.
    pub(crate) fn is_active_on_normalized(&self, domain: &str) -> bool {
        let mut current = domain;
        while !current.is_empty() {
            if let Some(&include) = self.entries.get(current) {
                return include;
            }
            current = match current.find('.') {
                Some(pos) => &current[pos + 1..],
                None => break,
            };
        }
        !self.has_includes
    }

    /// True when every include entry is `doc_domain` itself or one of its subdomains.
    pub fn is_active_only_on_domain(&self, doc_domain: &str) -> bool {
        if !self.has_includes {
            return false;
        }
        let domain = match normalize_domain(doc_domain) {
            Ok(domain) if !domain.is_empty() => domain,
            _ => return false,
        };

        self.include_domains().all(|include| {
            include == domain
                || (include.len() > domain.len()
                    && include.ends_with(domain.as_str())
                    && include.as_bytes()[include.len() - domain.len() - 1] == b'.')
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filters/domains.rs"]
mod unit_tests;
