//! Fuzz target for contents API payload decoding.

#![no_main]

use libfuzzer_sys::fuzz_target;
use repo_etl::remote::codec::decode_content;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(text) = std::str::from_utf8(data) {
        let _ = decode_content(text);
    }
});
