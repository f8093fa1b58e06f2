#![no_main]

use common::jwt::extract_bearer_token;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(header) = std::str::from_utf8(data) {
        if let Some(token) = extract_bearer_token(header) {
            assert!(!token.is_empty());
            assert!(header.starts_with("Bearer "));
        }
    }
});
