//! Fuzz target: JSON deserialization of `JobBody` and parameter merging.
//!
//! Malformed bodies must be rejected without panicking.

#![no_main]

use iotpay_gateway::routes::JobBody;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(body) = serde_json::from_slice::<JobBody>(data) {
        let expected = body.action.clone();
        let (action, _) = body.into_parts();
        assert_eq!(action, expected, "merging params must not touch the action");
    }
});
