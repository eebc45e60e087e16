use std::fmt;

use serde::Serialize;

use crate::error::CoreError;

const PREFIX: &str = "0x";
const HEX_DIGITS: usize = 64;

/// A well-formed payment proof: `0x` followed by 64 hex digits.
///
/// Only the shape is checked. Whether the proof refers to a real transfer
/// is left to a `ChainVerifier`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PaymentProof(String);

impl PaymentProof {
    /// Validate the shape of a raw proof string.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidProof`] if the prefix, length or digits are wrong.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let invalid = |reason: String| CoreError::InvalidProof { reason };
        let digits = raw
            .strip_prefix(PREFIX)
            .ok_or_else(|| invalid("missing 0x prefix".to_owned()))?;
        if digits.len() != HEX_DIGITS {
            return Err(invalid(format!(
                "expected {HEX_DIGITS} hex digits after 0x, got {}",
                digits.len()
            )));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid("proof contains non-hex characters".to_owned()));
        }
        Ok(Self(raw.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PaymentProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
