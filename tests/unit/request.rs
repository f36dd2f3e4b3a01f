#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn new_works() {
        let request =
            Request::new("https://ads.example.com/ad.js", "https://www.example.com/", "script")
                .unwrap();
        assert_eq!(request.url, "https://ads.example.com/ad.js");
        assert_eq!(request.hostname, "ads.example.com");
        assert_eq!(request.source_hostname, "www.example.com");
        assert_eq!(request.content_type, ContentType::SCRIPT);
        assert!(!request.is_third_party);
        assert_eq!(request.sitekey, None);

        let request =
            Request::new("https://ads.tracker.net/p.gif", "https://www.example.com/", "image")
                .unwrap();
        assert!(request.is_third_party);
        assert_eq!(request.content_type, ContentType::IMAGE);
    }

    #[test]
    fn urls_are_normalized() {
        let request = Request::new("HTTP://Example.COM/Path", "", "document").unwrap();
        assert_eq!(request.url, "http://example.com/Path");
        assert_eq!(request.hostname, "example.com");
    }

    #[test]
    fn empty_source_is_first_party() {
        let request = Request::new("https://example.com/", "", "document").unwrap();
        assert!(!request.is_third_party);
        assert_eq!(request.source_url, "");
        assert_eq!(request.source_hostname, "");
        assert_eq!(request.content_type, ContentType::DOCUMENT);
    }

    #[test]
    fn public_suffixes_are_respected() {
        let request =
            Request::new("https://a.example.co.uk/", "https://b.example.co.uk/", "image").unwrap();
        assert!(!request.is_third_party);

        let request =
            Request::new("https://example.co.uk/", "https://other.co.uk/", "image").unwrap();
        assert!(request.is_third_party);

        assert_eq!(base_domain("www.example.co.uk"), "example.co.uk");
        assert_eq!(base_domain("example.com."), "example.com");
    }

    #[test]
    fn websocket_scheme_wins() {
        let request = Request::new("wss://example.com/socket", "", "xmlhttprequest").unwrap();
        assert_eq!(request.content_type, ContentType::WEBSOCKET);
    }

    #[test]
    fn invalid_urls() {
        assert_eq!(
            Request::new("not a url", "", "image").unwrap_err(),
            RequestError::HostnameParseError
        );
        assert_eq!(
            Request::new("https://example.com/", "not a url", "image").unwrap_err(),
            RequestError::SourceHostnameParseError
        );
    }

    #[test]
    fn internationalized_hostnames() {
        let request = Request::new("https://bücher.example/a.js", "https://bücher.example/", "script")
            .unwrap();
        assert_eq!(request.hostname, "xn--bcher-kva.example");
        assert!(!request.is_third_party);
        assert_eq!(
            Request::new("https://exa mple.com/", "", "image").unwrap_err(),
            RequestError::HostnameParseError
        );
    }

    #[test]
    fn request_types() {
        assert_eq!(cpt_match_type("main_frame"), ContentType::DOCUMENT);
        assert_eq!(cpt_match_type("sub_frame"), ContentType::SUBDOCUMENT);
        assert_eq!(cpt_match_type("xhr"), ContentType::XMLHTTPREQUEST);
        assert_eq!(cpt_match_type("beacon"), ContentType::PING);
        assert_eq!(cpt_match_type("imageset"), ContentType::IMAGE);
        assert_eq!(cpt_match_type("csp_report"), ContentType::CSP);
        assert_eq!(cpt_match_type("something-new"), ContentType::OTHER);
    }

    #[test]
    fn preparsed_skips_parsing() {
        let request = Request::preparsed(
            "https://cdn.example.net/a.js",
            "cdn.example.net",
            "https://example.com",
            "example.com",
            "script",
            true,
        )
        .with_sitekey("abc");
        assert!(request.is_third_party);
        assert_eq!(request.content_type, ContentType::SCRIPT);
        assert_eq!(request.sitekey.as_deref(), Some("abc"));
    }
}
