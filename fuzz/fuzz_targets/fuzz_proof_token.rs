//! Fuzz target: `derive_proof_token` over arbitrary parts.
//!
//! The token must always be `0x` followed by 16 hex digits.

#![no_main]

use iotpay_executor::derive_proof_token;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let parts: Vec<&str> = text.split('\0').collect();
    let token = derive_proof_token(&parts);
    assert_eq!(token.len(), 18, "token must be 0x + 16 hex digits");
    assert!(token.starts_with("0x"));
    assert!(token[2..].bytes().all(|b| b.is_ascii_hexdigit()));
});
