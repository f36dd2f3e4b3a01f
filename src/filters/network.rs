//! URL filters: blocking rules and their `@@` exceptions, including option parsing and the
//! translation of wildcard patterns into regular expressions.

use once_cell::sync::Lazy;
use regex::{bytes::Regex as BytesRegex, bytes::RegexBuilder as BytesRegexBuilder, Regex};

use std::fmt;

use crate::filters::domains::{normalize_domain, DomainSet};
use crate::filters::{Filter, FilterError};
use crate::lists::{ParseOptions, UnknownOptionPolicy};
use crate::utils;

bitflags::bitflags! {
    /// Resource types a request can have and a URL filter can be restricted to.
    ///
    /// Bit positions are stable. Unnamed bits below `ALL` are preserved so masks produced by newer
    /// hosts pass through untouched.
    pub struct ContentType: u32 {
        const OTHER = 1;
        const SCRIPT = 2;
        const IMAGE = 4;
        const STYLESHEET = 8;
        const OBJECT = 16;
        const SUBDOCUMENT = 32;
        const DOCUMENT = 64;
        const WEBSOCKET = 128;
        const BACKGROUND = 256;
        const XBL = 512;
        const PING = 1024;
        const XMLHTTPREQUEST = 2048;
        const OBJECT_SUBREQUEST = 4096;
        const DTD = 8192;
        const MEDIA = 16384;
        const FONT = 32768;

        const CSP = 1 << 16;
        const WEBRTC = 1 << 17;
        const POPUP = 1 << 24;
        const GENERICBLOCK = 1 << 25;
        const ELEMHIDE = 1 << 26;
        const GENERICHIDE = 1 << 27;

        const ALL = 0x7FFF_FFFF;

        // Only applied when a filter names them explicitly
        const SPECIAL = Self::CSP.bits
            | Self::POPUP.bits
            | Self::GENERICBLOCK.bits
            | Self::ELEMHIDE.bits
            | Self::GENERICHIDE.bits;

        const DEFAULT = Self::ALL.bits & !Self::SPECIAL.bits;
    }
}

impl ContentType {
    /// Looks up an option name (already uppercased, `-` replaced by `_`).
    pub fn from_option_name(name: &str) -> Option<ContentType> {
        let content_type = match name {
            "OTHER" => ContentType::OTHER,
            "SCRIPT" => ContentType::SCRIPT,
            "IMAGE" => ContentType::IMAGE,
            "STYLESHEET" => ContentType::STYLESHEET,
            "OBJECT" => ContentType::OBJECT,
            "SUBDOCUMENT" => ContentType::SUBDOCUMENT,
            "DOCUMENT" => ContentType::DOCUMENT,
            "WEBSOCKET" => ContentType::WEBSOCKET,
            "BACKGROUND" => ContentType::BACKGROUND,
            "XBL" => ContentType::XBL,
            "PING" => ContentType::PING,
            "XMLHTTPREQUEST" => ContentType::XMLHTTPREQUEST,
            "OBJECT_SUBREQUEST" => ContentType::OBJECT_SUBREQUEST,
            "DTD" => ContentType::DTD,
            "MEDIA" => ContentType::MEDIA,
            "FONT" => ContentType::FONT,
            "CSP" => ContentType::CSP,
            "WEBRTC" => ContentType::WEBRTC,
            "POPUP" => ContentType::POPUP,
            "GENERICBLOCK" => ContentType::GENERICBLOCK,
            "ELEMHIDE" => ContentType::ELEMHIDE,
            "GENERICHIDE" => ContentType::GENERICHIDE,
            _ => return None,
        };
        Some(content_type)
    }
}

/// Separator placeholder `^`: anything that can't be part of a URL word, or the end of the URL.
const SEPARATOR: &str = r"(?:[^\w\-.%\x80-\xFF]|$)";
/// Replacement for a leading `||`: scheme, slashes and any subdomain prefix.
const EXTENDED_ANCHOR: &str = r"^[\w\-]+:/+(?:[^/]+\.)?";

static OPTIONS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(~?[\w\-]+(?:=[^,\s]+)?(?:,~?[\w\-]+(?:=[^,\s]+)?)*)$").unwrap()
});
static PROTOCOL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\|?[\w\-]+:").unwrap());
static MULTI_WILDCARD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*+").unwrap());

#[derive(Debug, Clone)]
pub enum CompiledRegex {
    Compiled(BytesRegex),
    MatchAll,
}

impl CompiledRegex {
    pub fn is_match(&self, url: &str) -> bool {
        match self {
            CompiledRegex::MatchAll => true,
            CompiledRegex::Compiled(r) => r.is_match(url.as_bytes()),
        }
    }
}

impl fmt::Display for CompiledRegex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompiledRegex::MatchAll => write!(f, ".*"),
            CompiledRegex::Compiled(r) => write!(f, "{}", r.as_str()),
        }
    }
}

/// A URL filter. The same structure backs blocking filters and `@@` exceptions; which one it is
/// is decided by the [`Filter`] variant wrapping it.
#[derive(Debug, Clone)]
pub struct RegExpFilter {
    pub text: String,
    /// Pattern with the `@@` prefix and the options suffix removed.
    pub pattern: String,
    pub regex: CompiledRegex,
    pub content_type: ContentType,
    pub match_case: bool,
    pub third_party: Option<bool>,
    pub domains: Option<DomainSet>,
    pub sitekeys: Option<Vec<String>>,
    /// Only meaningful for blocking filters, always `None` on exceptions.
    pub collapse: Option<bool>,
    is_regex_literal: bool,
}

/// Everything the `$...` suffix of a filter can set.
#[derive(Debug, Default)]
struct FilterOptions {
    /// `None` until the first type option; folded in the order options appear.
    content_type: Option<ContentType>,
    explicit_document: bool,
    match_case: bool,
    third_party: Option<bool>,
    domains: Option<String>,
    sitekeys: Option<String>,
    collapse: Option<bool>,
}

impl FilterOptions {
    fn parse(raw: &str, policy: UnknownOptionPolicy) -> Result<FilterOptions, FilterError> {
        let mut options = FilterOptions::default();

        for option in raw.to_ascii_uppercase().split(',') {
            let (name, value) = match option.find('=') {
                Some(pos) => (&option[..pos], Some(&option[pos + 1..])),
                None => (option, None),
            };
            let (negated, name) = match name.strip_prefix('~') {
                Some(name) => (true, name),
                None => (false, name),
            };
            let name = name.replace('-', "_");

            if let Some(content_type) = ContentType::from_option_name(&name) {
                options.content_type = Some(if negated {
                    options.content_type.unwrap_or(ContentType::DEFAULT) - content_type
                } else {
                    if content_type == ContentType::DOCUMENT {
                        options.explicit_document = true;
                    }
                    options.content_type.unwrap_or_else(ContentType::empty) | content_type
                });
                continue;
            }

            match (name.as_str(), value) {
                ("MATCH_CASE", _) => options.match_case = true,
                ("DOMAIN", Some(value)) => options.domains = Some(value.to_owned()),
                ("SITEKEY", Some(value)) => options.sitekeys = Some(value.to_owned()),
                ("THIRD_PARTY", _) => options.third_party = Some(!negated),
                ("COLLAPSE", _) => options.collapse = Some(!negated),
                _ => {
                    if policy == UnknownOptionPolicy::Reject {
                        return Err(FilterError::UnknownOption(option.to_owned()));
                    }
                }
            }
        }

        Ok(options)
    }

}

impl RegExpFilter {
    /// Parses a URL filter line into either [`Filter::Blocking`] or [`Filter::Whitelist`].
    pub fn parse(text: &str, parse_options: &ParseOptions) -> Result<Filter, FilterError> {
        let (is_whitelist, rest) = match text.strip_prefix("@@") {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let (pattern, options) = match OPTIONS_RE.captures(rest) {
            Some(captures) => {
                let whole = captures.get(0).map_or(rest.len(), |m| m.start());
                let raw = captures.get(1).map_or("", |m| m.as_str());
                (
                    &rest[..whole],
                    FilterOptions::parse(raw, parse_options.unknown_options)?,
                )
            }
            None => (rest, FilterOptions::default()),
        };

        let mut content_type = options.content_type;
        if is_whitelist
            && content_type.map_or(true, |t| t.contains(ContentType::DOCUMENT))
            && !options.explicit_document
            && !PROTOCOL_RE.is_match(pattern)
        {
            content_type = Some(content_type.unwrap_or(ContentType::DEFAULT) - ContentType::DOCUMENT);
        }

        let domains = match &options.domains {
            Some(domains) => DomainSet::parse(domains, '|')?,
            None => None,
        };
        let sitekeys = options.sitekeys.as_ref().map(|keys| {
            keys.split('|')
                .filter(|key| !key.is_empty())
                .map(str::to_owned)
                .collect::<Vec<_>>()
        });

        let (regex, is_regex_literal) = compile_regex(pattern, options.match_case)?;

        let filter = RegExpFilter {
            text: text.to_owned(),
            pattern: pattern.to_owned(),
            regex,
            content_type: content_type.unwrap_or(ContentType::DEFAULT),
            match_case: options.match_case,
            third_party: options.third_party,
            domains,
            sitekeys,
            collapse: if is_whitelist { None } else { options.collapse },
            is_regex_literal,
        };

        if is_whitelist {
            Ok(Filter::Whitelist(filter))
        } else {
            Ok(Filter::Blocking(filter))
        }
    }

    /// Full check of a request against this filter.
    pub fn matches(
        &self,
        url: &str,
        type_mask: ContentType,
        doc_domain: &str,
        third_party: bool,
        sitekey: Option<&str>,
    ) -> bool {
        let domain = normalize_domain(doc_domain).unwrap_or_default();
        self.matches_normalized(url, type_mask, &domain, third_party, sitekey)
    }

    /// Same as [`RegExpFilter::matches`] with the document domain already normalized.
    pub(crate) fn matches_normalized(
        &self,
        url: &str,
        type_mask: ContentType,
        doc_domain: &str,
        third_party: bool,
        sitekey: Option<&str>,
    ) -> bool {
        if !self.content_type.intersects(type_mask) {
            return false;
        }
        if let Some(expected) = self.third_party {
            if expected != third_party {
                return false;
            }
        }
        if let Some(keys) = &self.sitekeys {
            match sitekey {
                Some(sitekey) if keys.iter().any(|k| k.eq_ignore_ascii_case(sitekey)) => (),
                _ => return false,
            }
        }
        if let Some(domains) = &self.domains {
            if !domains.is_active_on_normalized(doc_domain) {
                return false;
            }
        }
        self.regex.is_match(url)
    }

    pub fn is_active_on_domain(&self, doc_domain: &str) -> bool {
        self.domains
            .as_ref()
            .map_or(true, |d| d.is_active_on_domain(doc_domain))
    }

    pub fn is_active_only_on_domain(&self, doc_domain: &str) -> bool {
        self.domains
            .as_ref()
            .map_or(false, |d| d.is_active_only_on_domain(doc_domain))
    }

    /// A filter without an include list applies on every site.
    pub fn is_generic(&self) -> bool {
        self.domains.as_ref().map_or(true, |d| !d.has_includes())
    }

    /// Lowercased literal runs of the pattern, any of which has to appear as a whole token in a
    /// matching URL. Regular expression filters have none.
    pub fn keyword_candidates(&self) -> Vec<String> {
        if self.is_regex_literal {
            return vec![];
        }
        let lowered = self.pattern.to_ascii_lowercase();
        let (core, left_anchored) = if let Some(core) = lowered.strip_prefix("||") {
            (core, true)
        } else if let Some(core) = lowered.strip_prefix('|') {
            (core, true)
        } else {
            (lowered.as_str(), false)
        };
        let (core, right_anchored) = match core.strip_suffix('|') {
            Some(core) => (core, true),
            None => (core, false),
        };

        utils::keyword_candidates(core, left_anchored, right_anchored)
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// Source of the regular expression the pattern compiled to.
    pub fn regex_source(&self) -> String {
        self.regex.to_string()
    }
}

fn compile_regex(pattern: &str, match_case: bool) -> Result<(CompiledRegex, bool), FilterError> {
    let is_regex_literal = pattern.len() >= 2 && pattern.starts_with('/') && pattern.ends_with('/');
    let source = if is_regex_literal {
        unescape_literal_regex(&pattern[1..pattern.len() - 1])
    } else {
        wildcard_to_regex(pattern)
    };

    if source == ".*" {
        return Ok((CompiledRegex::MatchAll, is_regex_literal));
    }

    let compiled = BytesRegexBuilder::new(&source)
        .unicode(false)
        .case_insensitive(!match_case)
        .build();
    let compiled = match compiled {
        // Hand-written expressions may carry non-ASCII literals
        Err(_) if is_regex_literal => BytesRegexBuilder::new(&source)
            .case_insensitive(!match_case)
            .build(),
        other => other,
    };

    compiled
        .map(|r| (CompiledRegex::Compiled(r), is_regex_literal))
        .map_err(|e| FilterError::InvalidRegex(e.to_string()))
}

/// Rewrites an Adblock wildcard pattern into a regular expression.
pub(crate) fn wildcard_to_regex(pattern: &str) -> String {
    let collapsed = MULTI_WILDCARD_RE.replace_all(pattern, "*");
    let collapsed = match collapsed.strip_suffix("^|") {
        Some(head) => format!("{}^", head),
        None => collapsed.into_owned(),
    };

    let mut escaped = String::with_capacity(collapsed.len() * 2);
    for c in collapsed.chars() {
        push_escaped(c, &mut escaped);
    }

    let source = escaped.replace(r"\*", ".*").replace(r"\^", SEPARATOR);
    let source = if let Some(rest) = source.strip_prefix(r"\|\|") {
        format!("{}{}", EXTENDED_ANCHOR, rest)
    } else if let Some(rest) = source.strip_prefix(r"\|") {
        format!("^{}", rest)
    } else {
        source
    };
    let source = match source.strip_suffix(r"\|") {
        Some(rest) => format!("{}$", rest),
        None => source,
    };

    let source = source.strip_prefix(".*").unwrap_or(&source);
    let source = source.strip_suffix(".*").unwrap_or(source);
    if source.is_empty() {
        String::from(".*")
    } else {
        source.to_owned()
    }
}

fn is_regex_meta(c: char) -> bool {
    matches!(
        c,
        '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$' | '#'
            | '&' | '-' | '~'
    )
}

/// Escapes one pattern character. Non-ASCII characters become byte escapes so the expression can
/// be compiled without Unicode support.
fn push_escaped(c: char, out: &mut String) {
    if c.is_ascii() {
        if is_regex_meta(c) {
            out.push('\\');
        }
        out.push(c);
    } else {
        let mut buf = [0u8; 4];
        for b in c.encode_utf8(&mut buf).bytes() {
            out.push_str(&format!(r"\x{:02X}", b));
        }
    }
}

/// Drops escapes in front of punctuation that has no special meaning, such as `\/`.
fn unescape_literal_regex(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next) if next.is_ascii_punctuation() && !is_regex_meta(next) => out.push(next),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/filters/network.rs"]
mod unit_tests;
