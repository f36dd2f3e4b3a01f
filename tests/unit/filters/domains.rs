#[cfg(test)]
mod tests {
    use super::super::*;

    fn set(source: &str, separator: char) -> DomainSet {
        DomainSet::parse(source, separator).unwrap().unwrap()
    }

    #[test]
    fn normalizes_domains() {
        assert_eq!(normalize_domain("Example.com.").unwrap(), "EXAMPLE.COM");
        assert_eq!(normalize_domain("").unwrap(), "");
        assert_eq!(normalize_domain("münchen.de").unwrap(), "XN--MNCHEN-3YA.DE");
    }

    #[test]
    fn parses_entries() {
        let domains = set("example.com|~foo.example.com", '|');
        assert!(domains.has_includes());
        assert_eq!(domains.include_domains().collect::<Vec<_>>(), vec!["EXAMPLE.COM"]);
        assert_eq!(
            domains.exclude_domains().collect::<Vec<_>>(),
            vec!["FOO.EXAMPLE.COM"]
        );

        let excludes_only = set("~example.com", ',');
        assert!(!excludes_only.has_includes());

        assert_eq!(DomainSet::parse("", ',').unwrap(), None);
        assert_eq!(DomainSet::parse("~", '|').unwrap(), None);
    }

    #[test]
    fn include_list_walks_up() {
        let domains = set("example.com", '|');
        assert!(domains.is_active_on_domain("example.com"));
        assert!(domains.is_active_on_domain("foo.example.com"));
        assert!(domains.is_active_on_domain("EXAMPLE.COM."));
        assert!(!domains.is_active_on_domain("example.org"));
        assert!(!domains.is_active_on_domain("com"));
        assert!(!domains.is_active_on_domain(""));
    }

    #[test]
    fn most_specific_entry_wins() {
        let domains = set("example.com|~foo.example.com", '|');
        assert!(domains.is_active_on_domain("example.com"));
        assert!(!domains.is_active_on_domain("foo.example.com"));
        assert!(!domains.is_active_on_domain("bar.foo.example.com"));
        assert!(domains.is_active_on_domain("www.example.com"));

        let domains = set("~example.com|foo.example.com", '|');
        assert!(!domains.is_active_on_domain("example.com"));
        assert!(domains.is_active_on_domain("foo.example.com"));
        assert!(!domains.is_active_on_domain("other.com"));
    }

    #[test]
    fn exclude_only_list_applies_elsewhere() {
        let domains = set("~example.com", '|');
        assert!(!domains.is_active_on_domain("example.com"));
        assert!(!domains.is_active_on_domain("foo.example.com"));
        assert!(domains.is_active_on_domain("other.com"));
        assert!(domains.is_active_on_domain(""));
    }

    #[test]
    fn trailing_dots_are_ignored() {
        let domains = set("example.com.", '|');
        assert!(domains.is_active_on_domain("example.com"));
        assert!(domains.is_active_on_domain("example.com."));
    }

    #[test]
    fn active_only_on_domain() {
        let domains = set("example.com", '|');
        assert!(domains.is_active_only_on_domain("example.com"));
        assert!(domains.is_active_only_on_domain("com"));
        assert!(!domains.is_active_only_on_domain("foo.example.com"));
        assert!(!domains.is_active_only_on_domain(""));

        let domains = set("example.com|foo.example.com", '|');
        assert!(domains.is_active_only_on_domain("example.com"));
        assert!(!domains.is_active_only_on_domain("foo.example.com"));

        let domains = set("example.com|example.org", '|');
        assert!(!domains.is_active_only_on_domain("example.com"));

        let domains = set("~example.com", '|');
        assert!(!domains.is_active_only_on_domain("example.com"));
    }
}
