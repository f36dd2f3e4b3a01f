//! Parsing of whole filter lists: whitespace normalization of lines, the `[Adblock Plus x.y]`
//! header and the INI-style blocks used to persist filter state.

use std::collections::HashMap;

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::filters::elemhide::ElemHideFilter;

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\[Adblock(?:\s*Plus\s*([\d.]+)?)?\]$").unwrap());
static DIVIDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*?)(#+)(.*)$").unwrap());

/// What to do with a `$option` the parser does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownOptionPolicy {
    /// Skip the option and keep the rest of the filter.
    Ignore,
    /// Turn the whole filter into an invalid one.
    Reject,
}

impl Default for UnknownOptionPolicy {
    fn default() -> Self {
        UnknownOptionPolicy::Ignore
    }
}

/// Options for tweaking how filters are parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseOptions {
    #[serde(default)]
    pub unknown_options: UnknownOptionPolicy,
}

/// Filter lines of a list, normalized and stripped of blank lines and headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterList {
    /// Minimum version declared by an `[Adblock Plus x.y]` header.
    pub required_version: Option<String>,
    pub filters: Vec<String>,
}

/// Cleans up whitespace the way each kind of line tolerates it.
///
/// Whitespace other than plain spaces is always dropped. Comments are trimmed, element hiding
/// rules lose spaces on the domain side and keep them inside the selector, everything else loses
/// all spaces.
pub fn normalize_filter(text: &str) -> String {
    let text: String = text
        .chars()
        .filter(|&c| c == ' ' || !c.is_whitespace())
        .collect();

    if text.trim_start().starts_with('!') {
        return text.trim().to_owned();
    }

    if ElemHideFilter::is_elemhide(&text) {
        if let Some(captures) = DIVIDER_RE.captures(&text) {
            let domain: String = captures[1].chars().filter(|c| *c != ' ').collect();
            return format!("{}{}{}", domain, &captures[2], captures[3].trim());
        }
    }

    text.chars().filter(|c| *c != ' ').collect()
}

/// Version declared by a list header line, `Some("")` for a header without one.
pub fn header_version(line: &str) -> Option<&str> {
    HEADER_RE
        .captures(line.trim())
        .map(|captures| captures.get(1).map_or("", |m| m.as_str()))
}

pub fn is_header(line: &str) -> bool {
    header_version(line).is_some()
}

/// Splits list text into normalized filter lines. Only the first line can be a header.
pub fn parse_filter_list(text: &str) -> FilterList {
    let mut list = FilterList::default();
    let mut lines = text.lines().peekable();

    if let Some(version) = lines.peek().copied().and_then(header_version) {
        if !version.is_empty() {
            list.required_version = Some(version.to_owned());
        }
        lines.next();
    }

    for line in lines {
        let filter = normalize_filter(line);
        if !filter.is_empty() {
            list.filters.push(filter);
        }
    }

    list
}

/// Reads back the `[Filter]` blocks written by [`crate::filters::Filter::serialize`]. Other
/// sections are skipped.
pub fn parse_serialized_filters(text: &str) -> Vec<HashMap<String, String>> {
    let mut lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .peekable();

    lines
        .batching(|it| loop {
            let header = it.next()?;
            let is_filter = header == "[Filter]";
            let mut block = HashMap::new();
            while let Some(line) = it.peek() {
                if line.starts_with('[') {
                    break;
                }
                if let Some((key, value)) = line.split_once('=') {
                    block.insert(key.to_owned(), value.to_owned());
                }
                it.next();
            }
            if is_filter && block.contains_key("text") {
                return Some(block);
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../tests/unit/lists.rs"]
mod unit_tests;
