//! Contains structures needed to describe network requests.

use thiserror::Error;

use crate::filters::network::ContentType;

/// Possible failure reasons when creating a [`Request`].
#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("hostname parsing failed")]
    HostnameParseError,
    #[error("source hostname parsing failed")]
    SourceHostnameParseError,
}

impl From<url::ParseError> for RequestError {
    fn from(_err: url::ParseError) -> RequestError {
        RequestError::HostnameParseError
    }
}

/// Maps webRequest style resource type names to content types.
pub fn cpt_match_type(cpt: &str) -> ContentType {
    match cpt {
        "beacon" | "ping" => ContentType::PING,
        "csp_report" => ContentType::CSP,
        "document" | "main_frame" => ContentType::DOCUMENT,
        "font" => ContentType::FONT,
        "image" | "imageset" => ContentType::IMAGE,
        "media" => ContentType::MEDIA,
        "object" => ContentType::OBJECT,
        "object_subrequest" => ContentType::OBJECT_SUBREQUEST,
        "script" => ContentType::SCRIPT,
        "stylesheet" => ContentType::STYLESHEET,
        "sub_frame" | "subdocument" => ContentType::SUBDOCUMENT,
        "websocket" => ContentType::WEBSOCKET,
        "xhr" | "xmlhttprequest" => ContentType::XMLHTTPREQUEST,
        "xbl" => ContentType::XBL,
        "xml_dtd" | "dtd" => ContentType::DTD,
        "background" => ContentType::BACKGROUND,
        "webrtc" => ContentType::WEBRTC,
        "popup" => ContentType::POPUP,
        _ => ContentType::OTHER,
    }
}

/// Registrable part of a hostname, the hostname itself when the public suffix list has no answer.
pub fn base_domain(hostname: &str) -> &str {
    let trimmed = hostname.trim_end_matches('.');
    psl::domain_str(trimmed).unwrap_or(trimmed)
}

/// A network request as seen by the engine.
#[derive(Clone, Debug)]
pub struct Request {
    pub url: String,
    pub hostname: String,
    /// URL of the document issuing the request, empty for top-level navigations.
    pub source_url: String,
    pub source_hostname: String,
    pub content_type: ContentType,
    pub is_third_party: bool,
    pub sitekey: Option<String>,
}

impl Request {
    /// Parses both URLs; third-party status comes from comparing their registrable domains.
    pub fn new(url: &str, source_url: &str, request_type: &str) -> Result<Request, RequestError> {
        let parsed = url::Url::parse(url)?;
        let hostname = parsed.host_str().unwrap_or("").to_owned();

        let (source_url, source_hostname) = if source_url.is_empty() {
            (String::new(), String::new())
        } else {
            let source =
                url::Url::parse(source_url).map_err(|_| RequestError::SourceHostnameParseError)?;
            let source_hostname = source.host_str().unwrap_or("").to_owned();
            (source.as_str().to_owned(), source_hostname)
        };

        let is_third_party = !source_hostname.is_empty()
            && !base_domain(&hostname).eq_ignore_ascii_case(base_domain(&source_hostname));

        let content_type = match parsed.scheme() {
            "ws" | "wss" => ContentType::WEBSOCKET,
            _ => cpt_match_type(request_type),
        };

        Ok(Request {
            url: parsed.as_str().to_owned(),
            hostname,
            source_url,
            source_hostname,
            content_type,
            is_third_party,
            sitekey: None,
        })
    }

    /// If the caller already knows hostnames and party, this skips URL and public suffix parsing.
    /// Take care to pass data correctly.
    pub fn preparsed(
        url: &str,
        hostname: &str,
        source_url: &str,
        source_hostname: &str,
        request_type: &str,
        third_party: bool,
    ) -> Request {
        Request {
            url: url.to_owned(),
            hostname: hostname.to_owned(),
            source_url: source_url.to_owned(),
            source_hostname: source_hostname.to_owned(),
            content_type: cpt_match_type(request_type),
            is_third_party: third_party,
            sitekey: None,
        }
    }

    pub fn with_sitekey(mut self, sitekey: &str) -> Request {
        self.sitekey = Some(sitekey.to_owned());
        self
    }
}

#[cfg(test)]
#[path = "../tests/unit/request.rs"]
mod unit_tests;
