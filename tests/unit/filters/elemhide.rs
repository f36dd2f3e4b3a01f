#[cfg(test)]
mod parse_tests {
    use super::super::*;

    #[derive(Debug, PartialEq)]
    struct ElemHideBreakdown {
        selector: String,
        selector_domain: Option<String>,
        is_generic: bool,
    }

    impl From<&ElemHideFilter> for ElemHideBreakdown {
        fn from(filter: &ElemHideFilter) -> ElemHideBreakdown {
            ElemHideBreakdown {
                selector: filter.selector.clone(),
                selector_domain: filter.selector_domain.clone(),
                is_generic: filter.is_generic(),
            }
        }
    }

    fn parse(text: &str) -> Result<ElemHideFilter, FilterError> {
        ElemHideFilter::parse(text).expect("elemhide syntax")
    }

    fn breakdown(text: &str) -> ElemHideBreakdown {
        ElemHideBreakdown::from(&parse(text).unwrap())
    }

    #[test]
    fn raw_selectors() {
        assert_eq!(
            breakdown("##.ad"),
            ElemHideBreakdown {
                selector: String::from(".ad"),
                selector_domain: None,
                is_generic: true,
            }
        );
        assert_eq!(
            breakdown("example.com##div[id='ad'] > p"),
            ElemHideBreakdown {
                selector: String::from("div[id='ad'] > p"),
                selector_domain: Some(String::from("example.com")),
                is_generic: false,
            }
        );
    }

    #[test]
    fn structured_selectors() {
        assert_eq!(breakdown("#div").selector, "div");
        assert_eq!(breakdown("#*(ad)").selector, ".ad,#ad");
        assert_eq!(breakdown("#div(ad)").selector, "div.ad,div#ad");
        assert_eq!(
            breakdown("#div(title=ad)(width=100)").selector,
            r#"div[title="ad"][width="100"]"#
        );
        assert_eq!(
            breakdown("#img(ad)(src^=http)").selector,
            r#"img.ad[src^="http"],img#ad[src^="http"]"#
        );
        assert_eq!(breakdown("#*(src*=ads)").selector, r#"[src*="ads"]"#);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let err = parse("#div(foo)(bar)").unwrap_err();
        assert_eq!(err, FilterError::ElemHideDuplicateId);
        assert_eq!(err.reason(), "filter_elemhide_duplicate_id");
    }

    #[test]
    fn missing_criteria_is_rejected() {
        let err = parse("example.com#*").unwrap_err();
        assert_eq!(err.reason(), "filter_elemhide_nocriteria");
    }

    #[test]
    fn unbalanced_selector_is_rejected() {
        let err = parse("##[foo").unwrap_err();
        assert_eq!(err, FilterError::ElemHideUnbalancedSelector);
        assert!(parse("##a[title=\"x]\"]").is_ok());
        assert!(parse("##div:not(.a").is_err());
        assert!(parse("##a[href='x").is_err());
    }

    #[test]
    fn domain_lists_are_cleaned() {
        let filter = parse(",example.com,,~foo.example.com,##.ad").unwrap();
        assert_eq!(filter.selector_domain.as_deref(), Some("example.com"));
        assert!(filter.is_active_on_domain("example.com"));
        assert!(filter.is_active_on_domain("www.example.com"));
        assert!(!filter.is_active_on_domain("foo.example.com"));
        assert!(!filter.is_active_on_domain("other.com"));

        let filter = parse("b.com,a.com##.ad").unwrap();
        assert_eq!(filter.selector_domain.as_deref(), Some("a.com,b.com"));
    }

    #[test]
    fn exclusions_only_stay_generic() {
        let filter = parse("~example.com##.ad").unwrap();
        assert!(filter.is_generic());
        assert!(filter.selector_domain.is_none());
        assert!(!filter.is_active_on_domain("example.com"));
        assert!(filter.is_active_on_domain("other.com"));
    }

    #[test]
    fn not_elemhide_syntax() {
        assert!(ElemHideFilter::parse("||example.com^").is_none());
        assert!(ElemHideFilter::parse("example.com/page#anchor").is_none());
        assert!(ElemHideFilter::parse("##{display:none}").is_none());
        assert!(!ElemHideFilter::is_elemhide("@@foo#bar"));
        assert!(ElemHideFilter::is_elemhide("example.com##.ad"));
    }
}
