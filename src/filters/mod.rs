//! Parsed filter rules. [`Filter::parse`] turns one normalized line of a filter list into one of
//! the [`Filter`] variants and never fails; malformed lines become [`Filter::Invalid`].

pub mod domains;
pub mod elemhide;
pub mod network;

use thiserror::Error;

use crate::filters::elemhide::ElemHideFilter;
use crate::filters::network::RegExpFilter;
use crate::lists::ParseOptions;

/// Why a line could not be turned into a working filter.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum FilterError {
    #[error("element hiding filter specifies more than one id")]
    ElemHideDuplicateId,
    #[error("element hiding filter has no criteria")]
    ElemHideNoCriteria,
    #[error("element hiding selector is not closed")]
    ElemHideUnbalancedSelector,
    #[error("invalid regular expression: {0}")]
    InvalidRegex(String),
    #[error("unknown filter option {0}")]
    UnknownOption(String),
    #[error("invalid domain {0}")]
    InvalidDomain(String),
}

impl FilterError {
    /// Stable identifier for message catalogs.
    pub fn reason(&self) -> &'static str {
        match self {
            FilterError::ElemHideDuplicateId => "filter_elemhide_duplicate_id",
            FilterError::ElemHideNoCriteria => "filter_elemhide_nocriteria",
            FilterError::ElemHideUnbalancedSelector => "filter_elemhide_unbalanced_selector",
            FilterError::InvalidRegex(_) => "filter_invalid_regexp",
            FilterError::UnknownOption(_) => "filter_unknown_option",
            FilterError::InvalidDomain(_) => "filter_invalid_domain",
        }
    }
}

/// Runtime state kept per filter, independent of its text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub disabled: bool,
    pub hit_count: u32,
    /// Milliseconds since the UNIX epoch, 0 if never hit.
    pub last_hit: u64,
}

impl FilterState {
    pub fn is_default(&self) -> bool {
        !self.disabled && self.hit_count == 0 && self.last_hit == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvalidFilter {
    pub text: String,
    pub reason: FilterError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentFilter {
    pub text: String,
}

#[derive(Debug, Clone)]
pub enum Filter {
    Invalid(InvalidFilter),
    Comment(CommentFilter),
    Blocking(RegExpFilter),
    Whitelist(RegExpFilter),
    ElemHide(ElemHideFilter),
}

impl Filter {
    /// Parses one normalized, non-empty filter line.
    pub fn parse(text: &str, options: &ParseOptions) -> Filter {
        if text.starts_with('!') {
            return Filter::Comment(CommentFilter {
                text: text.to_owned(),
            });
        }

        let parsed = match ElemHideFilter::parse(text) {
            Some(elemhide) => elemhide.map(Filter::ElemHide),
            None => RegExpFilter::parse(text, options),
        };

        parsed.unwrap_or_else(|reason| {
            Filter::Invalid(InvalidFilter {
                text: text.to_owned(),
                reason,
            })
        })
    }

    pub fn text(&self) -> &str {
        match self {
            Filter::Invalid(f) => &f.text,
            Filter::Comment(f) => &f.text,
            Filter::Blocking(f) | Filter::Whitelist(f) => &f.text,
            Filter::ElemHide(f) => &f.text,
        }
    }

    /// Filters that can take effect once added to an engine.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Filter::Blocking(_) | Filter::Whitelist(_) | Filter::ElemHide(_)
        )
    }

    pub fn as_regexp(&self) -> Option<&RegExpFilter> {
        match self {
            Filter::Blocking(f) | Filter::Whitelist(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_elemhide(&self) -> Option<&ElemHideFilter> {
        match self {
            Filter::ElemHide(f) => Some(f),
            _ => None,
        }
    }

    pub fn is_whitelist(&self) -> bool {
        matches!(self, Filter::Whitelist(_))
    }

    /// Inactive filters apply nowhere.
    pub fn is_active_on_domain(&self, doc_domain: &str) -> bool {
        match self {
            Filter::Blocking(f) | Filter::Whitelist(f) => f.is_active_on_domain(doc_domain),
            Filter::ElemHide(f) => f.is_active_on_domain(doc_domain),
            _ => false,
        }
    }

    pub fn is_active_only_on_domain(&self, doc_domain: &str) -> bool {
        match self {
            Filter::Blocking(f) | Filter::Whitelist(f) => f.is_active_only_on_domain(doc_domain),
            Filter::ElemHide(f) => f.is_active_only_on_domain(doc_domain),
            _ => false,
        }
    }

    /// INI-style block for persisting `state`. Only active filters with non-default state produce
    /// any lines, everything else can be rebuilt from the list text.
    pub fn serialize(&self, state: &FilterState) -> Vec<String> {
        if !self.is_active() || state.is_default() {
            return vec![];
        }

        let mut lines = vec![String::from("[Filter]"), format!("text={}", self.text())];
        if state.disabled {
            lines.push(String::from("disabled=true"));
        }
        if state.hit_count > 0 {
            lines.push(format!("hitCount={}", state.hit_count));
        }
        if state.last_hit > 0 {
            lines.push(format!("lastHit={}", state.last_hit));
        }
        lines
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filters/mod.rs"]
mod unit_tests;
