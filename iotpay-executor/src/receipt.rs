//! Record ids and short proof-of-execution tokens attached to action results.

use std::fmt::Write as _;

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Hex digits kept from the digest in a proof token.
const TOKEN_HEX_DIGITS: usize = 16;

/// Derive a short one-way token from the parts of an execution record.
///
/// `token = "0x" || hex(SHA-256(p0 || ":" || p1 || ...))[..16]`
///
/// The separator keeps `["ab", "c"]` and `["a", "bc"]` apart.
#[must_use]
pub fn derive_proof_token(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update(b":");
        }
        hasher.update(part.as_bytes());
    }
    let digest = hasher.finalize();

    let mut token = String::with_capacity(2 + TOKEN_HEX_DIGITS);
    token.push_str("0x");
    for byte in digest.iter().take(TOKEN_HEX_DIGITS / 2) {
        let _ = write!(token, "{byte:02x}");
    }
    token
}

/// Fresh random record id such as `job_3f9c1a2b4d5e`.
#[must_use]
pub fn new_record_id(prefix: &str) -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &simple[..12])
}
