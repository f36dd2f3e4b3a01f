//! Element hiding filters, both the structured `domain#tag(attr=value)` form and the
//! `domain##selector` form carrying a raw CSS selector.

use memchr::memchr as find_char;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::filters::domains::DomainSet;
use crate::filters::FilterError;

pub(crate) static ELEMHIDE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^([^/*|@"]*?)#(?:([\w\-]+|\*)((?:\([\w\-]+(?:[$^*]?=[^()"]*)?\))*)|#([^{}]+))$"#,
    )
    .unwrap()
});
static ATTR_RULE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\(([\w\-]+(?:[$^*]?=[^()"]*)?)\)"#).unwrap());
static COMMA_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",+").unwrap());

#[derive(Debug, Clone)]
pub struct ElemHideFilter {
    pub text: String,
    pub domains: Option<DomainSet>,
    /// Lowercased include domains joined by commas, `None` for generic filters.
    pub selector_domain: Option<String>,
    pub selector: String,
}

impl ElemHideFilter {
    /// Whether `text` uses element hiding syntax at all.
    pub fn is_elemhide(text: &str) -> bool {
        find_char(b'#', text.as_bytes()).is_some() && ELEMHIDE_RE.is_match(text)
    }

    /// Parses `text`, returning `None` if it is not element hiding syntax.
    pub fn parse(text: &str) -> Option<Result<ElemHideFilter, FilterError>> {
        find_char(b'#', text.as_bytes())?;
        ELEMHIDE_RE
            .captures(text)
            .map(|captures| ElemHideFilter::from_captures(text, &captures))
    }

    fn from_captures(text: &str, captures: &Captures) -> Result<ElemHideFilter, FilterError> {
        let domain_list = captures.get(1).map_or("", |m| m.as_str());

        let selector = match captures.get(4) {
            Some(raw) => {
                let raw = raw.as_str();
                if !is_balanced(raw) {
                    return Err(FilterError::ElemHideUnbalancedSelector);
                }
                raw.to_owned()
            }
            None => build_selector(
                captures.get(2).map_or("", |m| m.as_str()),
                captures.get(3).map_or("", |m| m.as_str()),
            )?,
        };

        let cleaned = COMMA_RUN_RE.replace_all(domain_list, ",");
        let cleaned = cleaned.trim_matches(',');
        let domains = DomainSet::parse(cleaned, ',')?;
        let selector_domain = domains.as_ref().and_then(|d| {
            let mut included: Vec<String> =
                d.include_domains().map(|s| s.to_ascii_lowercase()).collect();
            if included.is_empty() {
                None
            } else {
                included.sort();
                Some(included.join(","))
            }
        });

        Ok(ElemHideFilter {
            text: text.to_owned(),
            domains,
            selector_domain,
            selector,
        })
    }

    pub fn is_active_on_domain(&self, doc_domain: &str) -> bool {
        self.domains
            .as_ref()
            .map_or(true, |d| d.is_active_on_domain(doc_domain))
    }

    pub(crate) fn is_active_on_normalized(&self, doc_domain: &str) -> bool {
        self.domains
            .as_ref()
            .map_or(true, |d| d.is_active_on_normalized(doc_domain))
    }

    pub fn is_active_only_on_domain(&self, doc_domain: &str) -> bool {
        self.domains
            .as_ref()
            .map_or(false, |d| d.is_active_only_on_domain(doc_domain))
    }

    pub fn is_generic(&self) -> bool {
        self.domains.as_ref().map_or(true, |d| !d.has_includes())
    }
}

/// Builds a selector out of the `tag(attr=value)(id)` form. A bare token is taken as an id or a
/// class name, hence the two alternatives.
fn build_selector(tag: &str, attr_rules: &str) -> Result<String, FilterError> {
    let tag = if tag == "*" { "" } else { tag };
    let mut id: Option<&str> = None;
    let mut additional = String::new();

    for rule in ATTR_RULE_RE.captures_iter(attr_rules) {
        let rule = match rule.get(1) {
            Some(rule) => rule.as_str(),
            None => continue,
        };
        match rule.find('=') {
            Some(sep) if sep > 0 => {
                additional.push('[');
                additional.push_str(&rule[..=sep]);
                additional.push('"');
                additional.push_str(&rule[sep + 1..]);
                additional.push_str("\"]");
            }
            _ => {
                if id.is_some() {
                    return Err(FilterError::ElemHideDuplicateId);
                }
                id = Some(rule);
            }
        }
    }

    if let Some(id) = id {
        Ok(format!(
            "{tag}.{id}{add},{tag}#{id}{add}",
            tag = tag,
            id = id,
            add = additional
        ))
    } else if !tag.is_empty() || !additional.is_empty() {
        Ok(format!("{}{}", tag, additional))
    } else {
        Err(FilterError::ElemHideNoCriteria)
    }
}

/// Brackets, parentheses and quotes of a raw selector have to be closed.
fn is_balanced(selector: &str) -> bool {
    let mut open: Vec<char> = Vec::new();
    let mut quote: Option<char> = None;
    let mut chars = selector.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            chars.next();
            continue;
        }
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '[' | '(' => open.push(c),
            ']' => {
                if open.pop() != Some('[') {
                    return false;
                }
            }
            ')' => {
                if open.pop() != Some('(') {
                    return false;
                }
            }
            _ => (),
        }
    }

    open.is_empty() && quote.is_none()
}

#[cfg(test)]
#[path = "../../tests/unit/filters/elemhide.rs"]
mod unit_tests;
