#![no_main]

use abp_filter_engine::lists::{normalize_filter, ParseOptions};
use abp_filter_engine::Filter;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(filter) = std::str::from_utf8(data) {
        let normalized = normalize_filter(filter);
        if !normalized.is_empty() {
            let parsed = Filter::parse(&normalized, &ParseOptions::default());
            assert_eq!(parsed.text(), normalized);
        }
    }
});
