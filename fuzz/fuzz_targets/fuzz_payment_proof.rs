//! Fuzz target: `PaymentProof::parse` on arbitrary strings.
//!
//! Accepted proofs must always have the `0x` + 64 hex digit shape.

#![no_main]

use iotpay_core::PaymentProof;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(proof) = PaymentProof::parse(raw) {
        let s = proof.as_str();
        assert_eq!(s.len(), 66, "accepted proof must be 66 bytes");
        assert!(s.starts_with("0x"));
        assert!(s[2..].bytes().all(|b| b.is_ascii_hexdigit()));
    }
});
