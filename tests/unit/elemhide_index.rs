#[cfg(test)]
mod tests {
    use super::super::*;

    fn build(rules: &[&str]) -> (FilterRegistry, ElemHideIndex, Vec<FilterId>) {
        let mut registry = FilterRegistry::default();
        let mut index = ElemHideIndex::new();
        let mut ids = Vec::new();
        for rule in rules {
            let id = registry.from_text(rule).unwrap();
            let filter = registry
                .get(id)
                .and_then(|f| f.as_elemhide())
                .expect("element hiding filter");
            index.add(id, filter);
            ids.push(id);
        }
        (registry, index, ids)
    }

    #[test]
    fn selectors_come_out_in_insertion_order() {
        let (registry, index, _) = build(&[
            "example.com##.first",
            "##.second",
            "foo.example.com##.third",
            "example.com,example.org##.fourth",
        ]);
        assert_eq!(
            index.selectors_for_domain(&registry, "foo.example.com", false),
            vec![".first", ".second", ".third", ".fourth"]
        );
        assert_eq!(
            index.selectors_for_domain(&registry, "example.org", false),
            vec![".second", ".fourth"]
        );
    }

    #[test]
    fn specific_only_skips_generic_filters() {
        let (registry, index, _) = build(&["example.com##.ad", "##.ad2", "~example.com##.ad3"]);
        assert_eq!(
            index.selectors_for_domain(&registry, "example.com", false),
            vec![".ad", ".ad2"]
        );
        assert_eq!(
            index.selectors_for_domain(&registry, "example.com", true),
            vec![".ad"]
        );
        assert_eq!(
            index.selectors_for_domain(&registry, "other.com", false),
            vec![".ad2", ".ad3"]
        );
        assert!(index
            .selectors_for_domain(&registry, "other.com", true)
            .is_empty());
    }

    #[test]
    fn exclusions_win_at_the_most_specific_level() {
        let (registry, index, _) = build(&["example.com,~ads.example.com##.ad"]);
        assert_eq!(
            index.selectors_for_domain(&registry, "www.example.com", false),
            vec![".ad"]
        );
        assert!(index
            .selectors_for_domain(&registry, "x.ads.example.com", false)
            .is_empty());
    }

    #[test]
    fn duplicate_selectors_are_kept() {
        let (registry, index, _) = build(&["example.com##.ad", "##.ad"]);
        assert_eq!(
            index.selectors_for_domain(&registry, "EXAMPLE.com.", false),
            vec![".ad", ".ad"]
        );
    }

    #[test]
    fn disabled_filters_are_skipped() {
        let (mut registry, index, ids) = build(&["##.ad", "##.ad2"]);
        registry.state_mut(ids[0]).unwrap().disabled = true;
        assert_eq!(
            index.selectors_for_domain(&registry, "example.com", false),
            vec![".ad2"]
        );
    }

    #[test]
    fn keys_are_unique_and_resolvable() {
        let (_registry, index, ids) = build(&["##.a", "##.b", "example.com##.c"]);
        let keys: Vec<_> = ids.iter().map(|&id| index.key_for(id).unwrap()).collect();
        assert_ne!(keys[0], keys[1]);
        assert_ne!(keys[1], keys[2]);
        assert_ne!(keys[0], keys[2]);
        for (&id, key) in ids.iter().zip(&keys) {
            assert_eq!(key.len(), 12);
            assert_eq!(index.filter_by_key(key), Some(id));
        }
    }

    #[test]
    fn add_and_remove_are_idempotent() {
        let (registry, mut index, ids) = build(&["example.com##.ad", "##.ad2"]);
        let filter = registry.get(ids[0]).and_then(|f| f.as_elemhide()).unwrap();
        let key = index.key_for(ids[0]).unwrap().to_owned();
        index.add(ids[0], filter);
        assert_eq!(index.len(), 2);
        assert_eq!(index.key_for(ids[0]), Some(key.as_str()));

        index.remove(ids[0]);
        index.remove(ids[0]);
        assert_eq!(index.len(), 1);
        assert!(!index.has_filter(ids[0]));
        assert_eq!(index.filter_by_key(&key), None);
        assert!(index.by_domain.is_empty());
        assert_eq!(
            index.selectors_for_domain(&registry, "example.com", false),
            vec![".ad2"]
        );

        index.clear();
        assert!(index.is_empty());
        assert!(index
            .selectors_for_domain(&registry, "example.com", false)
            .is_empty());
    }

    #[test]
    fn readding_moves_a_filter_to_the_end() {
        let (registry, mut index, ids) = build(&["##.a", "##.b"]);
        index.remove(ids[0]);
        index.add(ids[0], registry.get(ids[0]).and_then(|f| f.as_elemhide()).unwrap());
        assert_eq!(
            index.selectors_for_domain(&registry, "example.com", false),
            vec![".b", ".a"]
        );
    }
}
