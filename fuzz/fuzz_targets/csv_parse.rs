//! Fuzz target for CSV parsing and JSON rendering.
//!
//! Feeds arbitrary text to the lenient parser and, when it succeeds, checks
//! that the rendered document is valid JSON with one element per record.

#![no_main]

use libfuzzer_sys::fuzz_target;
use repo_etl::tabular::{parse_tabular, serialize, ParseOptions};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok((records, _)) = parse_tabular(text, &ParseOptions::default()) {
        let json = serialize(&records).expect("serialize parsed records");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value.as_array().map(Vec::len), Some(records.len()));
    }
});
